//! Environment configuration.

use std::env;

pub const DEFAULT_RERENDER_MARGIN: usize = 160;

#[derive(Debug, Clone)]
pub struct EnvConfig {
    /// Bytes of trailing slack required before an already-closed diagram
    /// fence is rendered eagerly mid-stream.
    pub rerender_margin: usize,
    /// Force all diagram fences to plain code blocks.
    pub plain_diagrams: bool,
}

impl Default for EnvConfig {
    fn default() -> Self {
        Self {
            rerender_margin: DEFAULT_RERENDER_MARGIN,
            plain_diagrams: false,
        }
    }
}

impl EnvConfig {
    pub fn from_env() -> Self {
        Self {
            rerender_margin: env_usize("CHAT_STREAM_RERENDER_MARGIN")
                .unwrap_or(DEFAULT_RERENDER_MARGIN),
            plain_diagrams: env_flag("CHAT_STREAM_PLAIN_DIAGRAMS"),
        }
    }
}

fn env_flag(key: &str) -> bool {
    env::var(key).map(|value| value == "1").unwrap_or(false)
}

fn env_usize(key: &str) -> Option<usize> {
    env::var(key).ok().and_then(|value| value.trim().parse().ok())
}

#[cfg(test)]
mod tests {
    use super::{EnvConfig, DEFAULT_RERENDER_MARGIN};
    use std::env;
    use std::sync::{Mutex, OnceLock};

    struct EnvGuard {
        key: &'static str,
        previous: Option<String>,
    }

    impl Drop for EnvGuard {
        fn drop(&mut self) {
            if let Some(value) = &self.previous {
                env::set_var(self.key, value);
            } else {
                env::remove_var(self.key);
            }
        }
    }

    fn env_lock() -> std::sync::MutexGuard<'static, ()> {
        static LOCK: OnceLock<Mutex<()>> = OnceLock::new();
        LOCK.get_or_init(|| Mutex::new(()))
            .lock()
            .expect("env lock poisoned")
    }

    fn set_env_guard(key: &'static str, value: Option<&str>) -> EnvGuard {
        let previous = env::var(key).ok();
        if let Some(value) = value {
            env::set_var(key, value);
        } else {
            env::remove_var(key);
        }
        EnvGuard { key, previous }
    }

    #[test]
    fn env_defaults() {
        let _lock = env_lock();
        let _g1 = set_env_guard("CHAT_STREAM_RERENDER_MARGIN", None);
        let _g2 = set_env_guard("CHAT_STREAM_PLAIN_DIAGRAMS", None);

        let config = EnvConfig::from_env();
        assert_eq!(config.rerender_margin, DEFAULT_RERENDER_MARGIN);
        assert!(!config.plain_diagrams);
    }

    #[test]
    fn env_overrides_apply() {
        let _lock = env_lock();
        let _g1 = set_env_guard("CHAT_STREAM_RERENDER_MARGIN", Some("32"));
        let _g2 = set_env_guard("CHAT_STREAM_PLAIN_DIAGRAMS", Some("1"));

        let config = EnvConfig::from_env();
        assert_eq!(config.rerender_margin, 32);
        assert!(config.plain_diagrams);
    }

    #[test]
    fn malformed_margin_falls_back_to_default() {
        let _lock = env_lock();
        let _g1 = set_env_guard("CHAT_STREAM_RERENDER_MARGIN", Some("not-a-number"));
        let config = EnvConfig::from_env();
        assert_eq!(config.rerender_margin, DEFAULT_RERENDER_MARGIN);
    }
}
