use crate::wire::HealthRes;

/// Health check shared by the REST surface and the CLI.
///
/// The server only starts listening once the classifier has loaded, so a
/// reply from this service means the process is ready for traffic.
#[derive(Clone, Default)]
pub struct HealthService;

impl HealthService {
    pub fn new() -> Self {
        Self
    }

    /// Static check, no instance needed.
    pub fn check_health() -> HealthRes {
        HealthRes {
            ok: true,
            message: "Symptom triage service is running".into(),
        }
    }
}
