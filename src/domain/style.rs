// Colors and unit formats understood by Grafana

pub const GREEN: &str = "#56A64B";
pub const RED: &str = "#E02F44";
pub const ORANGE: &str = "#FF9830";
pub const YELLOW: &str = "#F2CC0C";
pub const BLUE: &str = "#3274D9";

pub const SHORT_FORMAT: &str = "short";
pub const MILLISECONDS_FORMAT: &str = "ms";
pub const PERCENT_FORMAT: &str = "percent";
pub const BYTES: &str = "bytes";
pub const MEGA_BYTES: &str = "mbytes";
pub const DECIMAL_MEGA_BYTES: &str = "decmbytes";
