//! JSON document format for grids.
//!
//! Element lists are sorted by id when a grid is exported, so two grids with
//! the same topology and operating point produce equal documents regardless
//! of insertion order or of slots freed by element removal. The HVDC
//! round-trip checks compare documents for that reason.

use crate::{
    Branch, Bus, ConverterStation, Gen, Grid, HvdcLine, Load, Network, SweError, SweResult,
    Transformer,
};
use serde::{Deserialize, Serialize};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::Path;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NetworkDocument {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub buses: Vec<Bus>,
    #[serde(default)]
    pub generators: Vec<Gen>,
    #[serde(default)]
    pub loads: Vec<Load>,
    #[serde(default)]
    pub converter_stations: Vec<ConverterStation>,
    #[serde(default)]
    pub lines: Vec<Branch>,
    #[serde(default)]
    pub transformers: Vec<Transformer>,
    #[serde(default)]
    pub hvdc_lines: Vec<HvdcLine>,
}

impl Grid {
    /// Export the grid as a document with id-sorted element lists.
    pub fn to_document(&self, id: &str) -> NetworkDocument {
        fn sorted<T: Clone, K: Ord>(items: Vec<&T>, key: impl Fn(&T) -> K) -> Vec<T> {
            let mut out: Vec<T> = items.into_iter().cloned().collect();
            out.sort_by_key(|item| key(item));
            out
        }

        NetworkDocument {
            id: id.to_string(),
            buses: sorted(self.buses(), |b| b.id.clone()),
            generators: sorted(self.generators(), |g| g.id.clone()),
            loads: sorted(self.loads(), |l| l.id.clone()),
            converter_stations: sorted(self.converters(), |c| c.id.clone()),
            lines: sorted(self.lines(), |l| l.id.clone()),
            transformers: sorted(self.transformers(), |t| t.id.clone()),
            hvdc_lines: sorted(self.hvdc_lines(), |h| h.id.clone()),
        }
    }

    /// Build a grid from a document. Buses come first so that branches and
    /// HVDC lines can resolve their endpoints.
    pub fn from_document(doc: &NetworkDocument) -> SweResult<Self> {
        let mut grid = Grid::new();
        for bus in &doc.buses {
            grid.add_bus(bus.clone())?;
        }
        for gen in &doc.generators {
            grid.add_generator(gen.clone())?;
        }
        for load in &doc.loads {
            grid.add_load(load.clone())?;
        }
        for converter in &doc.converter_stations {
            grid.add_converter(converter.clone())?;
        }
        for line in &doc.lines {
            grid.add_line(line.clone())?;
        }
        for tx in &doc.transformers {
            grid.add_transformer(tx.clone())?;
        }
        for hvdc in &doc.hvdc_lines {
            grid.add_hvdc_line(hvdc.clone())?;
        }
        Ok(grid)
    }
}

/// Load a network (single initial variant) from a JSON document.
pub fn load_network_json(path: &Path) -> SweResult<Network> {
    let file = File::open(path)?;
    let doc: NetworkDocument = serde_json::from_reader(BufReader::new(file))
        .map_err(|e| SweError::Parse(format!("{}: {e}", path.display())))?;
    let grid = Grid::from_document(&doc)?;
    let id = if doc.id.is_empty() {
        path.file_stem()
            .map(|s| s.to_string_lossy().into_owned())
            .unwrap_or_default()
    } else {
        doc.id.clone()
    };
    Ok(Network::from_grid(id, grid))
}

/// Write the working variant of `network` as a pretty-printed JSON document.
pub fn write_network_json(network: &Network, path: &Path) -> SweResult<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        std::fs::create_dir_all(parent)?;
    }
    let doc = network.grid().to_document(network.id());
    let writer = BufWriter::new(File::create(path)?);
    serde_json::to_writer_pretty(writer, &doc)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{Kilovolts, Megawatts, Zone};
    use tempfile::tempdir;

    fn sample_grid() -> Grid {
        let mut grid = Grid::new();
        grid.add_bus(Bus::new("FR1", Zone::Fr, Kilovolts(400.0))).unwrap();
        grid.add_bus(Bus::new("ES1", Zone::Es, Kilovolts(400.0))).unwrap();
        grid.add_generator(Gen::new("G_ES", "ES1").with_p_limits(0.0, 500.0))
            .unwrap();
        grid.add_load(Load::new("L_FR", "FR1", Megawatts(120.0))).unwrap();
        grid.add_line(Branch::new("ES1-FR1", "ES1", "FR1", 0.0, 0.02)).unwrap();
        grid
    }

    #[test]
    fn document_lists_are_sorted() {
        let doc = sample_grid().to_document("case");
        let bus_ids: Vec<&str> = doc.buses.iter().map(|b| b.id.as_str()).collect();
        assert_eq!(bus_ids, vec!["ES1", "FR1"]);
    }

    #[test]
    fn document_rebuilds_same_grid() {
        let doc = sample_grid().to_document("case");
        let rebuilt = Grid::from_document(&doc).unwrap();
        assert_eq!(rebuilt.to_document("case"), doc);
    }

    #[test]
    fn json_file_round_trip() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("grid.json");
        let network = Network::from_grid("case", sample_grid());
        write_network_json(&network, &path).unwrap();
        let loaded = load_network_json(&path).unwrap();
        assert_eq!(loaded.id(), "case");
        assert_eq!(
            loaded.grid().to_document("case"),
            network.grid().to_document("case")
        );
    }

    #[test]
    fn unknown_fields_are_rejected() {
        let json = r#"{ "buses": [], "switches": [] }"#;
        assert!(serde_json::from_str::<NetworkDocument>(json).is_err());
    }
}
