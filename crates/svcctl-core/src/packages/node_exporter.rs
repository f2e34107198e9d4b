//! Metrics exporter (native binary)

use super::{LaunchContext, Package};
use crate::instance::GracePeriods;

#[derive(Debug, Clone, Copy, Default)]
pub struct NodeExporter;

const LISTEN_PORT: &str = "NODE_EXPORTER_LISTEN_PORT";

impl Package for NodeExporter {
    fn kind(&self) -> &'static str {
        "node_exporter"
    }

    fn mandatory_vars(&self) -> &'static [&'static str] {
        &[LISTEN_PORT]
    }

    fn grace_periods(&self) -> GracePeriods {
        GracePeriods::from_secs(2, 5, 5)
    }

    fn startup_args(&self, ctx: &LaunchContext<'_>) -> Vec<String> {
        vec![
            ctx.package_dir().join("node_exporter").display().to_string(),
            format!("--web.listen-address=:{}", ctx.var(LISTEN_PORT)),
            "--collector.systemd".to_string(),
        ]
    }
}
