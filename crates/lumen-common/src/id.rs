use snowflake::SnowflakeIdBucket;
use std::sync::{Mutex, PoisonError};

/// Machine/node pair used when no explicit one was configured.
pub const DEFAULT_WORKER: (i32, i32) = (1, 1);

/// Snowflake generator that is configured lazily.
///
/// The process-wide instance behind [`init`] and [`next_id`] is what the
/// engine uses for alert status ids.
pub struct IdGenerator {
    bucket: Mutex<Option<SnowflakeIdBucket>>,
}

impl IdGenerator {
    pub const fn new() -> Self {
        Self {
            bucket: Mutex::new(None),
        }
    }

    /// `machine_id` and `node_id` must each be in `0..=31`.
    pub fn configure(&self, machine_id: i32, node_id: i32) {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        *bucket = Some(SnowflakeIdBucket::new(machine_id, node_id));
    }

    pub fn is_configured(&self) -> bool {
        self.bucket
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Next id as a decimal string; configures [`DEFAULT_WORKER`] on first use.
    pub fn next_id(&self) -> String {
        let mut bucket = self.bucket.lock().unwrap_or_else(PoisonError::into_inner);
        bucket
            .get_or_insert_with(|| SnowflakeIdBucket::new(DEFAULT_WORKER.0, DEFAULT_WORKER.1))
            .get_id()
            .to_string()
    }
}

impl Default for IdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

static GLOBAL: IdGenerator = IdGenerator::new();

/// Configures the process-wide generator.
pub fn init(machine_id: i32, node_id: i32) {
    GLOBAL.configure(machine_id, node_id);
}

/// Next id from the process-wide generator.
pub fn next_id() -> String {
    GLOBAL.next_id()
}
