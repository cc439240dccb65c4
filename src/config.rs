use std::env;

const DEFAULT_RAZORPAY_API_BASE: &str = "https://api.razorpay.com";

#[derive(Debug, Clone)]
pub struct Config {
    pub host: String,
    pub port: u16,
    pub database_path: String,
    /// Directory served under `/uploads`
    pub uploads_dir: String,
    /// Shown in notification emails
    pub store_name: String,
    /// Recipient of "new order" notifications (falls back to the from address)
    pub admin_email: Option<String>,
    /// Gateway credentials; checkout endpoints fail with 500 when unset
    pub razorpay: Option<RazorpayConfig>,
    /// Outbound mail; notifications are skipped when unset
    pub email: Option<EmailConfig>,
}

#[derive(Clone)]
pub struct RazorpayConfig {
    pub key_id: String,
    pub key_secret: String,
    pub api_base: String,
}

impl std::fmt::Debug for RazorpayConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RazorpayConfig")
            .field("key_id", &self.key_id)
            .field("key_secret", &"[REDACTED]")
            .field("api_base", &self.api_base)
            .finish()
    }
}

/// How the SMTP connection is secured.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SmtpTls {
    /// TLS from the first byte (usually port 465)
    Implicit,
    /// Upgrade with STARTTLS when the server offers it
    Opportunistic,
    /// Plaintext, for local relays such as a dev mail catcher
    None,
}

impl SmtpTls {
    pub fn from_env_value(value: Option<&str>) -> Self {
        match value.map(|v| v.trim().to_lowercase()).as_deref() {
            Some("true") | Some("1") => SmtpTls::Implicit,
            Some("none") | Some("off") => SmtpTls::None,
            _ => SmtpTls::Opportunistic,
        }
    }
}

#[derive(Clone)]
pub struct EmailConfig {
    pub host: String,
    pub port: u16,
    pub tls: SmtpTls,
    pub username: Option<String>,
    pub password: Option<String>,
    pub from_address: String,
}

impl std::fmt::Debug for EmailConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EmailConfig")
            .field("host", &self.host)
            .field("port", &self.port)
            .field("tls", &self.tls)
            .field("username", &self.username)
            .field("password", &self.password.as_ref().map(|_| "[REDACTED]"))
            .field("from_address", &self.from_address)
            .finish()
    }
}

fn non_empty_var(key: &str) -> Option<String> {
    env::var(key).ok().filter(|v| !v.trim().is_empty())
}

impl Config {
    pub fn from_env() -> Self {
        dotenvy::dotenv().ok();

        let host = env::var("HOST").unwrap_or_else(|_| "0.0.0.0".to_string());
        let port: u16 = env::var("PORT")
            .ok()
            .and_then(|p| p.parse().ok())
            .unwrap_or(6001);

        let razorpay = match (
            non_empty_var("RAZORPAY_KEY_ID"),
            non_empty_var("RAZORPAY_KEY_SECRET"),
        ) {
            (Some(key_id), Some(key_secret)) => Some(RazorpayConfig {
                key_id,
                key_secret,
                api_base: non_empty_var("RAZORPAY_API_BASE")
                    .unwrap_or_else(|| DEFAULT_RAZORPAY_API_BASE.to_string()),
            }),
            _ => None,
        };

        let email = match (non_empty_var("EMAIL_HOST"), non_empty_var("EMAIL_FROM")) {
            (Some(host), Some(from_address)) => Some(EmailConfig {
                host,
                port: env::var("EMAIL_PORT")
                    .ok()
                    .and_then(|p| p.parse().ok())
                    .unwrap_or(587),
                tls: SmtpTls::from_env_value(env::var("EMAIL_SECURE").ok().as_deref()),
                username: non_empty_var("EMAIL_USER"),
                password: non_empty_var("EMAIL_PASS"),
                from_address,
            }),
            _ => None,
        };

        Self {
            host,
            port,
            database_path: env::var("DATABASE_PATH").unwrap_or_else(|_| "zenstee.db".to_string()),
            uploads_dir: env::var("UPLOADS_DIR").unwrap_or_else(|_| "uploads".to_string()),
            store_name: env::var("STORE_NAME").unwrap_or_else(|_| "Zenstee".to_string()),
            admin_email: non_empty_var("ADMIN_EMAIL"),
            razorpay,
            email,
        }
    }

    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}
