/// Separator between the segments of a configuration key (`block:sub:key`)
pub const BLOCK_SEP: char = ':';
/// Separator between cluster and constituent names in a qualified process name
pub const PROCESS_NAME_SEP: char = '/';
/// Property carried by every process cluster
pub const CLUSTER_PROPERTY: &str = "_cluster";
/// Log filter used by the binary when `RUST_LOG` is not set
pub const DEFAULT_LOG_FILTER: &str = "info";
