//! Replica count validation policy.
//!
//! Validates:
//! - `spec.replicas` is set
//! - `spec.replicas` equals exactly REQUIRED_REPLICAS
//!
//! An unset count is denied rather than treated as the server-side default;
//! the API server applies defaulting after admission, so an absent value
//! here cannot be assumed to become the required count.

use super::{ValidationContext, ValidationResult};

/// The exact replica count this webhook admits
pub const REQUIRED_REPLICAS: i32 = 3;

/// Validate the desired replica count
pub fn validate(ctx: &ValidationContext<'_>) -> ValidationResult {
    let replicas = ctx
        .deployment
        .spec
        .as_ref()
        .and_then(|spec| spec.replicas);

    match replicas {
        Some(n) if n == REQUIRED_REPLICAS => ValidationResult::allowed(),
        Some(n) => ValidationResult::denied(
            "InvalidReplicas",
            &format!(
                "spec.replicas must be exactly {} (got {})",
                REQUIRED_REPLICAS, n
            ),
        ),
        None => ValidationResult::denied(
            "InvalidReplicas",
            &format!(
                "spec.replicas must be exactly {} (got unset)",
                REQUIRED_REPLICAS
            ),
        ),
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used, clippy::expect_used)]
mod tests {
    use super::*;
    use k8s_openapi::api::apps::v1::{Deployment, DeploymentSpec};
    use k8s_openapi::apimachinery::pkg::apis::meta::v1::ObjectMeta;

    fn create_deployment(replicas: Option<i32>) -> Deployment {
        Deployment {
            metadata: ObjectMeta {
                name: Some("test".to_string()),
                namespace: Some("default".to_string()),
                ..Default::default()
            },
            spec: Some(DeploymentSpec {
                replicas,
                ..Default::default()
            }),
            status: None,
        }
    }

    fn context(deployment: &Deployment) -> ValidationContext<'_> {
        ValidationContext {
            deployment,
            dry_run: false,
            namespace: Some("default"),
        }
    }

    #[test]
    fn test_required_replicas_allowed() {
        let deployment = create_deployment(Some(REQUIRED_REPLICAS));
        let result = validate(&context(&deployment));
        assert!(result.allowed);
        assert!(result.message.is_none());
    }

    #[test]
    fn test_wrong_replicas_denied() {
        for replicas in [0, 1, 5] {
            let deployment = create_deployment(Some(replicas));
            let result = validate(&context(&deployment));
            assert!(!result.allowed);
            assert_eq!(result.reason.unwrap(), "InvalidReplicas");
            assert!(
                result.message.unwrap().contains(&replicas.to_string()),
                "message must name the observed count {}",
                replicas
            );
        }
    }

    #[test]
    fn test_unset_replicas_denied() {
        let deployment = create_deployment(None);
        let result = validate(&context(&deployment));
        assert!(!result.allowed);
        assert!(result.message.unwrap().contains("unset"));
    }

    #[test]
    fn test_missing_spec_denied() {
        let deployment = Deployment {
            metadata: ObjectMeta::default(),
            spec: None,
            status: None,
        };
        let result = validate(&context(&deployment));
        assert!(!result.allowed);
        assert!(result.message.unwrap().contains("unset"));
    }
}
