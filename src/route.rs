/// Type-safe representation of the inbound topic roles
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Route {
    TelemetryIngest,
    StatusIngest,
    BatteryHistoryQuery,
    FaultHistoryQuery,
}

impl Route {
    /// Role name used in logs and config validation messages
    pub fn name(&self) -> &'static str {
        match self {
            Route::TelemetryIngest => "telemetry-ingest",
            Route::StatusIngest => "status-ingest",
            Route::BatteryHistoryQuery => "battery-history-query",
            Route::FaultHistoryQuery => "fault-history-query",
        }
    }

    /// All inbound roles, in subscription order
    pub fn all() -> &'static [Route] {
        &[
            Route::TelemetryIngest,
            Route::StatusIngest,
            Route::BatteryHistoryQuery,
            Route::FaultHistoryQuery,
        ]
    }
}

impl std::fmt::Display for Route {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn routes_listed_in_subscription_order() {
        let names: Vec<_> = Route::all().iter().map(|r| r.to_string()).collect();
        assert_eq!(
            names,
            vec![
                "telemetry-ingest",
                "status-ingest",
                "battery-history-query",
                "fault-history-query"
            ]
        );
    }
}
