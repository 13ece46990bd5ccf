//! Well-known object names used by the catalog and execution log.

/// Catalog document listing every monitored target.
pub const CATALOG_OBJECT: &str = "website-monitor-list.yml";

/// Shared index holding the most recent extraction of every job.
pub const LATEST_STATE_OBJECT: &str = "job-last-executed.json";

/// File extension of per-job history objects.
const HISTORY_EXTENSION: &str = ".json";

/// Name of the history object owned by `job_name`.
///
/// # Examples
///
/// ```
/// use pricewatch_core::naming::history_object_name;
///
/// assert_eq!(history_object_name("december"), "december.json");
/// assert_eq!(history_object_name("white-tshirt"), "white-tshirt.json");
/// ```
pub fn history_object_name(job_name: &str) -> String {
    format!("{job_name}{HISTORY_EXTENSION}")
}

/// Whether `job_name` can own a history object without clobbering another
/// object or escaping the store root.
///
/// Rejects empty names, names whose history object would be the shared
/// latest-state index, and names containing path separators or `..`.
pub fn is_valid_job_name(job_name: &str) -> bool {
    !job_name.trim().is_empty()
        && history_object_name(job_name) != LATEST_STATE_OBJECT
        && !job_name.contains(['/', '\\'])
        && !job_name.contains("..")
}

/// Whether `store` can name a bucket or a single directory under a local
/// root.
///
/// Rejects empty or padded names, `.`, and anything containing a path
/// separator, a drive colon or `..`, so an absolute or relative path can
/// never replace or escape the root.
pub fn is_valid_store_name(store: &str) -> bool {
    !store.is_empty()
        && store.trim() == store
        && store != "."
        && !store.contains(['/', '\\', ':'])
        && !store.contains("..")
}
