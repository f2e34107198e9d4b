//! Monitoring probe (native binary)

use super::{LaunchContext, Package};
use crate::instance::GracePeriods;

#[derive(Debug, Clone, Copy, Default)]
pub struct Netprobe;

const LISTEN_PORT: &str = "NETPROBE_LISTEN_PORT";

impl Package for Netprobe {
    fn kind(&self) -> &'static str {
        "netprobe"
    }

    fn mandatory_vars(&self) -> &'static [&'static str] {
        &[LISTEN_PORT]
    }

    fn grace_periods(&self) -> GracePeriods {
        GracePeriods::from_secs(2, 5, 5)
    }

    fn startup_args(&self, ctx: &LaunchContext<'_>) -> Vec<String> {
        vec![
            ctx.package_dir()
                .join("netprobe.linux_64")
                .display()
                .to_string(),
            "-port".to_string(),
            ctx.var(LISTEN_PORT).to_string(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::packages::test_support::{ctx, rc};
    use std::path::Path;

    #[test]
    fn test_startup_args() {
        let values = rc(&[
            ("NETPROBE_LISTEN_PORT", "7036"),
            ("INSTANCE_PACKAGE_VERSION", "active_prod"),
        ]);
        let ctx = ctx(
            Path::new("/srv"),
            Path::new("/srv/instances/netprobe/a1"),
            "netprobe",
            &values,
        );

        assert_eq!(
            Netprobe.startup_args(&ctx),
            vec![
                "/srv/packages/netprobe/active_prod/netprobe.linux_64",
                "-port",
                "7036"
            ]
        );
    }

    #[test]
    fn test_runtime_pattern_is_startup_command() {
        let values = rc(&[("NETPROBE_LISTEN_PORT", "7036")]);
        let ctx = ctx(
            Path::new("/srv"),
            Path::new("/srv/instances/netprobe/a1"),
            "netprobe",
            &values,
        );
        let args = Netprobe.startup_args(&ctx);
        let pattern = Netprobe.runtime_pattern(&ctx, &args).unwrap();

        assert!(pattern.is_match(&args.join(" ")));
        // Another probe on a different port is a different instance
        assert!(!pattern.is_match(
            "/srv/packages/netprobe/active_prod/netprobe.linux_64 -port 7037"
        ));
    }
}
