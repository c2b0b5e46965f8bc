use savvy_push::VapidIdentity;

/// Runtime configuration, read from the environment (`.env` honored).
#[derive(Debug, Clone)]
pub struct Config {
    pub db_path: String,
    pub host: String,
    pub port: u16,
    pub cors_origin: String,
    /// `None` when either VAPID key is absent; push stays disabled and the
    /// rest of the system runs as usual.
    pub vapid: Option<VapidIdentity>,
}

impl Config {
    pub fn from_env() -> anyhow::Result<Self> {
        let db_path = std::env::var("SAVVY_DB_PATH").unwrap_or_else(|_| "savvy.db".into());
        let host = std::env::var("SAVVY_HOST").unwrap_or_else(|_| "0.0.0.0".into());
        let port: u16 = std::env::var("SAVVY_PORT")
            .unwrap_or_else(|_| "3001".into())
            .parse()?;
        let cors_origin = std::env::var("CORS_ORIGIN").unwrap_or_else(|_| "*".into());

        let vapid = match (
            std::env::var("VAPID_PUBLIC_KEY"),
            std::env::var("VAPID_PRIVATE_KEY"),
        ) {
            (Ok(public_key), Ok(private_key))
                if !public_key.is_empty() && !private_key.is_empty() =>
            {
                Some(VapidIdentity {
                    subject: std::env::var("VAPID_SUBJECT")
                        .unwrap_or_else(|_| "mailto:admin@savvy.app".into()),
                    public_key,
                    private_key,
                })
            }
            _ => None,
        };

        Ok(Self {
            db_path,
            host,
            port,
            cors_origin,
            vapid,
        })
    }
}
