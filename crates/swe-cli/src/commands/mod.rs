pub mod completions;
pub mod dispatch;
pub mod exchanges;
pub mod hvdc;
pub mod shift;
pub mod util;
