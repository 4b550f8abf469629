use config::ObservabilityConfig;
use item_core::ItemCategory;
use metrics::counter;

/// Which key a lookup went through.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LookupPath {
    Local,
    Remote,
    LocalHint,
    Fingerprint
}

impl LookupPath {
    fn as_str(self) -> &'static str {
        match self {
            Self::Local => "local",
            Self::Remote => "remote",
            Self::LocalHint => "local_hint",
            Self::Fingerprint => "fingerprint"
        }
    }
}

/// Registry counters, emitted through the `metrics` facade.
#[derive(Debug, Clone)]
pub struct RegistryTelemetry {
    enabled: bool,
    created: String,
    lookups: String,
    conflicts: String,
    forgotten: String,
    rekeys: String
}

impl RegistryTelemetry {
    pub fn new(config: &ObservabilityConfig) -> Self {
        let prefix = &config.metrics_prefix;
        Self {
            enabled: config.metrics_enabled,
            created: format!("{prefix}_records_created_total"),
            lookups: format!("{prefix}_lookups_total"),
            conflicts: format!("{prefix}_conflicts_total"),
            forgotten: format!("{prefix}_records_forgotten_total"),
            rekeys: format!("{prefix}_rekeys_total")
        }
    }

    pub fn record_created(&self, category: ItemCategory, origin: &'static str) {
        if self.enabled {
            counter!(self.created.clone(), "category" => category.to_string(), "origin" => origin)
                .increment(1);
        }
    }

    pub fn record_lookup(&self, path: LookupPath, hit: bool) {
        if self.enabled {
            let outcome = if hit { "hit" } else { "miss" };
            counter!(self.lookups.clone(), "path" => path.as_str(), "outcome" => outcome)
                .increment(1);
        }
    }

    pub fn record_conflict(&self, kind: &'static str) {
        if self.enabled {
            counter!(self.conflicts.clone(), "kind" => kind).increment(1);
        }
    }

    pub fn record_forgotten(&self) {
        if self.enabled {
            counter!(self.forgotten.clone()).increment(1);
        }
    }

    pub fn record_rekey(&self) {
        if self.enabled {
            counter!(self.rekeys.clone()).increment(1);
        }
    }
}
