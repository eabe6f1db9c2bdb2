// EB Env Backup: Elastic Beanstalk environment source
//
// Lists every environment in the account/region, then reads each one's
// configuration settings and keeps only the application environment
// variables, in the order the service returns them.

use async_trait::async_trait;
use aws_sdk_elasticbeanstalk::error::DisplayErrorContext;
use aws_sdk_elasticbeanstalk::types::{ConfigurationOptionSetting, EnvironmentDescription};
use aws_sdk_elasticbeanstalk::Client;

use super::models::{BackupRecord, EnvVar, EnvironmentVariables};
use super::SourceError;

/// Option namespace that holds user-defined environment properties.
pub const ENVIRONMENT_NAMESPACE: &str = "aws:elasticbeanstalk:application:environment";

// ─── Trait ───────────────────────────────────────────────────────────────────

/// Producer of the configuration record that gets backed up.
#[async_trait]
pub trait EnvironmentSource: Send + Sync {
    async fn fetch(&self) -> Result<BackupRecord, SourceError>;
}

// ─── AWS Implementation ──────────────────────────────────────────────────────

pub struct BeanstalkSource {
    client: Client,
}

impl BeanstalkSource {
    pub fn new(client: Client) -> Self {
        Self { client }
    }

    pub fn from_conf(config: &aws_config::SdkConfig) -> Self {
        Self::new(Client::new(config))
    }

    async fn list_environments(&self) -> Result<Vec<EnvironmentDescription>, SourceError> {
        let mut environments = Vec::new();
        let mut next_token: Option<String> = None;

        loop {
            let page = self
                .client
                .describe_environments()
                .include_deleted(false)
                .set_next_token(next_token.take())
                .send()
                .await
                .map_err(|e| SourceError::Fetch {
                    call: "DescribeEnvironments",
                    message: DisplayErrorContext(&e).to_string(),
                })?;

            environments.extend(page.environments().iter().cloned());

            match continuation(page.next_token()) {
                Some(token) => next_token = Some(token),
                None => break,
            }
        }

        Ok(environments)
    }

    async fn environment_variables(
        &self,
        application: &str,
        environment: &str,
    ) -> Result<Vec<EnvVar>, SourceError> {
        let response = self
            .client
            .describe_configuration_settings()
            .application_name(application)
            .environment_name(environment)
            .send()
            .await
            .map_err(|e| SourceError::Fetch {
                call: "DescribeConfigurationSettings",
                message: format!("{}: {}", environment, DisplayErrorContext(&e)),
            })?;

        let settings = response.configuration_settings().first().ok_or_else(|| {
            SourceError::Incomplete(format!(
                "no configuration settings returned for environment '{}'",
                environment
            ))
        })?;

        Ok(application_variables(settings.option_settings()))
    }
}

/// Token for the next `DescribeEnvironments` page, if there is one.
fn continuation(next_token: Option<&str>) -> Option<String> {
    next_token
        .filter(|token| !token.is_empty())
        .map(str::to_string)
}

/// Environment and application name of a description; both are required to
/// read its configuration.
fn identify(description: &EnvironmentDescription) -> Result<(&str, &str), SourceError> {
    match (description.environment_name(), description.application_name()) {
        (Some(environment), Some(application)) => Ok((environment, application)),
        _ => Err(SourceError::Incomplete(
            "environment description without name or application".to_string(),
        )),
    }
}

/// Application environment variables among `settings`, in service order.
/// A setting without a value is kept with an empty one.
fn application_variables(settings: &[ConfigurationOptionSetting]) -> Vec<EnvVar> {
    settings
        .iter()
        .filter(|option| option.namespace() == Some(ENVIRONMENT_NAMESPACE))
        .filter_map(|option| {
            option
                .option_name()
                .map(|name| EnvVar::new(name, option.value().unwrap_or_default()))
        })
        .collect()
}

#[async_trait]
impl EnvironmentSource for BeanstalkSource {
    async fn fetch(&self) -> Result<BackupRecord, SourceError> {
        let mut record = BackupRecord::default();

        for description in self.list_environments().await? {
            let (environment, application) = identify(&description)?;

            let variables = self.environment_variables(application, environment).await?;
            tracing::debug!(
                environment = %environment,
                application = %application,
                variables = variables.len(),
                "Fetched environment variables"
            );

            record.environments.push(EnvironmentVariables {
                environment_name: environment.to_string(),
                variables,
            });
        }

        tracing::info!(
            environments = record.environments.len(),
            variables = record.variable_count(),
            "Fetched Beanstalk configuration"
        );
        Ok(record)
    }
}

// ─── In-Memory Mock for Testing ──────────────────────────────────────────────

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    /// Returns a fixed record, or fails, and counts how often it was asked.
    pub struct StaticSource {
        record: Option<BackupRecord>,
        calls: AtomicUsize,
    }

    impl StaticSource {
        pub fn new(record: BackupRecord) -> Self {
            Self {
                record: Some(record),
                calls: AtomicUsize::new(0),
            }
        }

        pub fn failing() -> Self {
            Self {
                record: None,
                calls: AtomicUsize::new(0),
            }
        }

        pub fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl EnvironmentSource for StaticSource {
        async fn fetch(&self) -> Result<BackupRecord, SourceError> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            self.record.clone().ok_or_else(|| SourceError::Fetch {
                call: "DescribeEnvironments",
                message: "AccessDenied".to_string(),
            })
        }
    }
}

// ─── Tests ───────────────────────────────────────────────────────────────────
