//! Dashboard counters derived from the current service set.

use serde::Serialize;

use super::service::Service;

/// Counters shown on the dashboard header. Always recomputed, never cached.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ServiceStats {
    pub total_services: usize,
    pub prod_ready_services: usize,
    pub uat_services: usize,
    pub pending_updates: usize,
}

impl ServiceStats {
    pub fn from_services(services: &[Service]) -> Self {
        let count = |pred: fn(&Service) -> bool| services.iter().filter(|s| pred(s)).count();
        ServiceStats {
            total_services: services.len(),
            prod_ready_services: count(Service::is_prod_ready),
            uat_services: count(Service::has_uat_candidate),
            pending_updates: count(Service::has_pending_update),
        }
    }
}
