// EB Env Backup: Shared AWS configuration
//
// Credentials and region come from the standard provider chain. An explicit
// region and an assume-role ARN can be layered on top for cross-account runs.

use aws_config::sts::AssumeRoleProvider;
use aws_config::{BehaviorVersion, Region, SdkConfig};
use aws_sdk_kms::config::SharedCredentialsProvider;

const ASSUME_ROLE_SESSION_NAME: &str = "eb-env-backup";

#[derive(Debug, Clone, Default)]
pub struct AwsSettings {
    pub region: Option<String>,
    pub assume_role_arn: Option<String>,
}

impl AwsSettings {
    /// Resolve the SDK configuration. Does not contact AWS by itself;
    /// credentials are resolved on the first request.
    pub async fn load(&self) -> SdkConfig {
        let mut loader = aws_config::defaults(BehaviorVersion::latest());
        if let Some(region) = &self.region {
            loader = loader.region(Region::new(region.clone()));
        }
        let base = loader.load().await;

        let Some(role_arn) = &self.assume_role_arn else {
            return base;
        };

        tracing::info!(role_arn = %role_arn, "Assuming role for AWS calls");
        let provider = AssumeRoleProvider::builder(role_arn.clone())
            .session_name(ASSUME_ROLE_SESSION_NAME)
            .configure(&base)
            .build()
            .await;

        base.into_builder()
            .credentials_provider(SharedCredentialsProvider::new(provider))
            .build()
    }
}
