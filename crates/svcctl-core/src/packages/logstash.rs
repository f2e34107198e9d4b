//! Log shipper (JVM)
//!
//! `bin/logstash` is a launcher script that execs into `bin/java`, so the
//! live process never shows the startup argv[0]. The runtime pattern matches
//! the java binary followed by the instance-specific flags instead.

use super::{LaunchContext, Package};
use crate::error::PatternError;
use crate::instance::GracePeriods;
use crate::pattern::{Fragment, RuntimePattern};

#[derive(Debug, Clone, Copy, Default)]
pub struct Logstash;

const HTTP_API_PORT: &str = "LOGSTASH_HTTP_API_PORT";

/// Interpreter the launcher script execs into, with its JVM options
const JAVA_PATTERN: &str = "bin/java .*";

impl Package for Logstash {
    fn kind(&self) -> &'static str {
        "logstash"
    }

    fn mandatory_vars(&self) -> &'static [&'static str] {
        &[HTTP_API_PORT]
    }

    fn grace_periods(&self) -> GracePeriods {
        GracePeriods::from_secs(10, 10, 10)
    }

    fn startup_args(&self, ctx: &LaunchContext<'_>) -> Vec<String> {
        vec![
            ctx.package_dir()
                .join("bin")
                .join("logstash")
                .display()
                .to_string(),
            format!("--path.config={}", ctx.workdir_path("logstash.conf")),
            format!("--path.data={}", ctx.workdir_path("data")),
            format!("--path.logs={}", ctx.workdir_path("logs")),
            "--config.reload.automatic".to_string(),
            "--http.host=0.0.0.0".to_string(),
            format!("--http.port={}", ctx.var(HTTP_API_PORT)),
        ]
    }

    fn runtime_pattern(
        &self,
        _ctx: &LaunchContext<'_>,
        startup_args: &[String],
    ) -> Result<RuntimePattern, PatternError> {
        let fragments = std::iter::once(Fragment::regex(JAVA_PATTERN))
            .chain(startup_args.iter().skip(1).cloned().map(Fragment::Literal))
            .collect();
        RuntimePattern::new(fragments)
    }
}
