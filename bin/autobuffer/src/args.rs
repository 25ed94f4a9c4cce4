use std::{collections::HashSet, ffi::OsString, path::PathBuf, str::FromStr, time::Duration};

use autobuffer::{parse_duration, AutobufferError, Credentials, StreamConfig};
use clap::{CommandFactory, Parser};
use fake_user_agent::get_chrome_rua;
use reqwest::{
    header::{HeaderMap, HeaderName, HeaderValue},
    Client,
};

#[derive(Parser, Debug, Clone)]
#[clap(version, author)]
/// Downloads a video and tells you when it is safe to start playing it.
pub struct AutobufferArgs {
    /// HTTP url of the video to stream
    #[clap(long)]
    pub url: Option<String>,

    /// Duration of the video to stream
    ///
    /// eg. "1h50m", "95m" or "5400s".
    #[clap(long, value_parser = parse_duration)]
    pub duration: Option<Duration>,

    /// Filepath to stream output
    #[clap(long, default_value = "out.mkv")]
    pub out: PathBuf,

    /// Username to use for HTTP basic auth
    #[clap(long, env = "AUTOBUFFER_USERNAME")]
    pub username: Option<String>,

    /// Password to use for HTTP basic auth
    #[clap(long, env = "AUTOBUFFER_PASSWORD", hide_env_values = true)]
    pub password: Option<String>,

    /// HTTP Header used to download
    ///
    /// Custom header. eg. "Referer: https://example.com".
    #[clap(short = 'H', long = "header")]
    pub headers: Vec<String>,

    /// Bytes downloaded up front to measure the available bandwidth
    #[clap(long, default_value_t = StreamConfig::DEFAULT_SAMPLE_SIZE)]
    pub sample_size: usize,

    /// Safety margin applied to the estimated download time
    #[clap(long, default_value_t = StreamConfig::DEFAULT_FUDGE_FACTOR)]
    pub fudge_factor: f64,

    /// Debug output
    #[clap(long, alias = "debug")]
    pub verbose: bool,
}

impl AutobufferArgs {
    /// Parses arguments, accepting `-url` as well as `--url`.
    pub fn parse_args<I>(args: I) -> Self
    where
        I: IntoIterator<Item = OsString>,
    {
        Self::parse_from(normalize_long_flags(args))
    }

    pub fn client(&self) -> Result<Client, AutobufferError> {
        let mut headers = HeaderMap::new();
        for header in &self.headers {
            let (key, value) = header
                .split_once(':')
                .ok_or_else(|| AutobufferError::InvalidHeader(header.clone()))?;
            headers.insert(
                HeaderName::from_str(key.trim())
                    .map_err(|_| AutobufferError::InvalidHeader(header.clone()))?,
                HeaderValue::from_str(value.trim())
                    .map_err(|_| AutobufferError::InvalidHeader(header.clone()))?,
            );
        }

        Client::builder()
            .default_headers(headers)
            .user_agent(get_chrome_rua())
            .build()
            .map_err(|source| AutobufferError::ConnectionError {
                url: self.url.clone().unwrap_or_default(),
                source,
            })
    }

    pub fn credentials(&self) -> Option<Credentials> {
        match (&self.username, &self.password) {
            (None, None) => None,
            (username, password) => Some(Credentials::new(
                username.clone().unwrap_or_default(),
                password.clone(),
            )),
        }
    }

    pub fn config(&self) -> StreamConfig {
        StreamConfig::default()
            .with_sample_size(self.sample_size)
            .with_fudge_factor(self.fudge_factor)
    }
}

/// Rewrites single-dash long flags (`-url`, `-duration=1h`) to their `--` form.
fn normalize_long_flags<I>(args: I) -> Vec<OsString>
where
    I: IntoIterator<Item = OsString>,
{
    let command = AutobufferArgs::command();
    let mut long_flags: HashSet<String> = command
        .get_arguments()
        .flat_map(|arg| arg.get_long_and_visible_aliases().unwrap_or_default())
        .map(str::to_string)
        .collect();
    long_flags.extend(["help".to_string(), "version".to_string()]);

    args.into_iter()
        .map(|arg| {
            let Some(flag) = arg.to_str() else {
                return arg;
            };
            let Some(name) = flag.strip_prefix('-') else {
                return arg;
            };
            if name.starts_with('-') {
                return arg;
            }

            let name = name.split_once('=').map_or(name, |(name, _)| name);
            if name.len() > 1 && long_flags.contains(name) {
                OsString::from(format!("-{flag}"))
            } else {
                arg
            }
        })
        .collect()
}
