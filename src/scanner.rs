//! # Availability Scanner
//!
//! One inventory query per scan. The first location whose state is not one of the
//! negative literals wins, in exactly the order the provider returned records and
//! locations. Every location looked at is written to the event log so operators can see
//! each value the decision was based on.

use crate::api::OrderApi;
use crate::cancel::CancellationToken;
use crate::events::EventLog;
use crate::model::{AvailabilityRecord, DatacenterAvailability, Selection};
use crate::pipeline::{PipelineError, Step};
use tracing::instrument;

pub struct AvailabilityScanner<'a> {
    api: &'a dyn OrderApi,
    log: &'a EventLog,
}

impl<'a> AvailabilityScanner<'a> {
    pub fn new(api: &'a dyn OrderApi, log: &'a EventLog) -> Self {
        Self { api, log }
    }

    /// Queries inventory for `plan_code`. `Ok(None)` means nothing is in stock, which is
    /// a normal outcome. API failures are returned as-is and are not retried.
    #[instrument(skip(self, token))]
    pub async fn scan(
        &self,
        plan_code: &str,
        token: &CancellationToken,
    ) -> Result<Option<Selection>, PipelineError> {
        let records = self
            .api
            .availabilities(plan_code, token)
            .await
            .map_err(|e| PipelineError::step(Step::Availability, e))?;

        if records.is_empty() {
            self.log.warning(format!(
                "No availability information found for plan code {}",
                plan_code
            ));
            return Ok(None);
        }

        let selection = inspect(&records, |fqn, dc| {
            self.log.info(format!(
                "Model: {}, datacenter: {}, availability: {}",
                fqn,
                dc.datacenter,
                dc.state()
            ));
        });

        match &selection {
            Some(found) => self.log.success(format!(
                "Server {} available in datacenter {}!",
                found.fqn, found.datacenter
            )),
            None => self.log.warning(format!(
                "No server currently available for plan code {}",
                plan_code
            )),
        }
        Ok(selection)
    }
}

/// Pure selection rule: first eligible location in input order.
pub fn select_available(records: &[AvailabilityRecord]) -> Option<Selection> {
    inspect(records, |_, _| {})
}

/// Walks records and locations in order, calling `visit` for each location inspected,
/// and stops at the first eligible one.
fn inspect<F>(records: &[AvailabilityRecord], mut visit: F) -> Option<Selection>
where
    F: FnMut(&str, &DatacenterAvailability),
{
    for record in records {
        for dc in &record.datacenters {
            visit(&record.fqn, dc);
            if dc.is_eligible() {
                return Some(Selection {
                    fqn: record.fqn.clone(),
                    datacenter: dc.datacenter.clone(),
                    availability: dc.state().to_string(),
                });
            }
        }
    }
    None
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{CallKind, MockOrderApi, Reply};
    use crate::api::ApiError;
    use crate::model::Severity;

    fn record(fqn: &str, dcs: &[(&str, &str)]) -> AvailabilityRecord {
        AvailabilityRecord {
            fqn: fqn.to_string(),
            datacenters: dcs
                .iter()
                .map(|(dc, state)| DatacenterAvailability::new(*dc, *state))
                .collect(),
        }
    }

    #[test]
    fn picks_first_eligible_location_in_input_order() {
        let records = vec![
            record("X", &[("rbx", "unavailable"), ("gra", "19-now")]),
            record("Y", &[("sbg", "1H-high")]),
        ];
        let selection = select_available(&records).unwrap();
        assert_eq!(selection.fqn, "X");
        assert_eq!(selection.datacenter, "gra");
        assert_eq!(selection.availability, "19-now");
    }

    #[test]
    fn never_prefers_a_later_more_available_location() {
        let records = vec![
            record("A", &[("bhs", "unknown"), ("waw", "240H")]),
            record("B", &[("gra", "1H-high"), ("rbx", "available")]),
        ];
        let selection = select_available(&records).unwrap();
        assert_eq!((selection.fqn.as_str(), selection.datacenter.as_str()), ("A", "waw"));
    }

    #[test]
    fn location_without_a_name_is_passed_over() {
        let records = vec![record("X", &[("", "1H-high"), ("sbg", "72H")])];
        let selection = select_available(&records).unwrap();
        assert_eq!(selection.datacenter, "sbg");

        assert_eq!(select_available(&[record("Y", &[("", "1H-high")])]), None);
    }

    #[test]
    fn all_negative_states_mean_not_found() {
        let records = vec![
            record("A", &[("bhs", "unknown"), ("waw", "unavailable")]),
            record("B", &[("gra", "unavailable")]),
            record("C", &[]),
        ];
        assert_eq!(select_available(&records), None);
    }

    #[tokio::test]
    async fn scan_logs_each_inspected_location_then_selection() {
        let mock = MockOrderApi::new();
        mock.expect(CallKind::Availabilities)
            .return_ok(Reply::Availabilities(vec![record(
                "X",
                &[("rbx", "unavailable"), ("gra", "19-now"), ("sbg", "1H")],
            )]));
        let log = EventLog::default();
        let token = CancellationToken::new();

        let selection = AvailabilityScanner::new(&mock, &log)
            .scan("X", &token)
            .await
            .unwrap()
            .unwrap();
        assert_eq!(selection.datacenter, "gra");

        let events = log.snapshot();
        let inspected: Vec<_> = events
            .iter()
            .filter(|e| e.severity == Severity::Info)
            .map(|e| e.message.as_str())
            .collect();
        assert_eq!(
            inspected,
            [
                "Model: X, datacenter: rbx, availability: unavailable",
                "Model: X, datacenter: gra, availability: 19-now",
            ]
        );
        assert_eq!(events.last().unwrap().severity, Severity::Success);
        mock.verify();
    }

    #[tokio::test]
    async fn empty_inventory_is_not_found_with_warning() {
        let mock = MockOrderApi::new();
        mock.expect(CallKind::Availabilities)
            .return_ok(Reply::Availabilities(vec![]));
        let log = EventLog::default();

        let result = AvailabilityScanner::new(&mock, &log)
            .scan("X", &CancellationToken::new())
            .await
            .unwrap();
        assert!(result.is_none());
        assert_eq!(log.snapshot()[0].severity, Severity::Warning);
    }

    #[tokio::test]
    async fn api_failure_is_fatal() {
        let mock = MockOrderApi::new();
        mock.expect(CallKind::Availabilities).return_err(ApiError::Status {
            status: 503,
            body: "maintenance".into(),
        });
        let log = EventLog::default();

        let err = AvailabilityScanner::new(&mock, &log)
            .scan("X", &CancellationToken::new())
            .await
            .unwrap_err();
        assert!(matches!(
            err,
            PipelineError::Step {
                step: Step::Availability,
                ..
            }
        ));
    }
}
