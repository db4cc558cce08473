use lemonsqueezy_license::{
    error::{ErrorKind, LicenseError},
    model::LicenseResponse,
    LicenseClient,
};
use std::{env, error::Error};
use tracing_subscriber::EnvFilter;

enum Action {
    Activate { instance_name: String },
    Deactivate { instance_id: String },
    Validate { instance_id: Option<String> },
}

impl Action {
    fn from_env() -> Result<Self, Box<dyn Error + Send + Sync>> {
        let operation = env::var("LEMONSQUEEZY_OPERATION").unwrap_or_else(|_| "validate".into());
        let instance_id = env::var("LEMONSQUEEZY_INSTANCE_ID").ok();

        match operation.as_str() {
            "activate" => Ok(Action::Activate {
                instance_name: env::var("LEMONSQUEEZY_INSTANCE_NAME")
                    .unwrap_or_else(|_| "Playground".into()),
            }),
            "deactivate" => Ok(Action::Deactivate {
                instance_id: instance_id
                    .ok_or("LEMONSQUEEZY_INSTANCE_ID is required to deactivate")?,
            }),
            "validate" => Ok(Action::Validate { instance_id }),
            other => Err(format!("unknown operation `{other}`").into()),
        }
    }
}

fn report(res: &impl LicenseResponse) {
    if let Some(key) = res.license_key() {
        tracing::info!(status = %key.status, remaining = key.remaining_activations());
    }
    if let Some(instance) = res.instance() {
        tracing::info!(instance_id = %instance.id, instance_name = %instance.name);
    }
    if let Some(meta) = res.meta() {
        tracing::info!(customer_name = %meta.customer_name, customer_email = %meta.customer_email);
    }
    if let Some(error) = res.error() {
        tracing::warn!("{error}");
    }
}

fn report_error(err: &LicenseError) {
    match err.kind() {
        ErrorKind::MalformedResponse => {
            tracing::error!("received an invalid response from the server");
        }
        ErrorKind::Response { status, message } => {
            tracing::error!(%status, message = message.as_deref().unwrap_or_default());
        }
        _ => tracing::error!(err = ?err),
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error + Send + Sync>> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .init();

    let license_key = env::var("LEMONSQUEEZY_LICENSE_KEY")
        .map_err(|_| "expected LEMONSQUEEZY_LICENSE_KEY to be set")?;
    let action = Action::from_env()?;

    let mut builder = LicenseClient::builder();
    if let Ok(base_url) = env::var("LEMONSQUEEZY_API_URL") {
        builder = builder.base_url(base_url);
    }
    if let Ok(api_key) = env::var("LEMONSQUEEZY_API_KEY") {
        builder = builder.api_key(api_key);
    }
    let client = builder.build();

    let outcome = match action {
        Action::Activate { instance_name } => client
            .activate(&license_key, &instance_name)
            .await
            .map(|res| {
                report(&res);
                res.activated
            }),
        Action::Deactivate { instance_id } => client
            .deactivate(&license_key, &instance_id)
            .await
            .map(|res| {
                report(&res);
                res.deactivated
            }),
        Action::Validate { instance_id } => client
            .validate(&license_key, instance_id.as_deref())
            .await
            .map(|res| {
                report(&res);
                res.valid
            }),
    };

    match outcome {
        Ok(outcome) => {
            tracing::info!(outcome, "done");
            Ok(())
        }
        Err(err) => {
            report_error(&err);
            Err(err.into())
        }
    }
}
