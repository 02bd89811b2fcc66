use env_collector::{run_env_collector_cli, EnvCollectorSettingsBuilder, PrefixFilter};
use sensiscan_server::Settings;

fn main() {
    run_env_collector_cli::<Settings>(
        EnvCollectorSettingsBuilder::default()
            .service_name("SENSISCAN".to_string())
            .markdown_path("README.md".to_string())
            .config_path("sensiscan-server/config/example.toml".to_string())
            .vars_filter(PrefixFilter::blacklist(&[
                "SENSISCAN__SERVER",
                "SENSISCAN__METRICS",
                "SENSISCAN__TRACING",
                "SENSISCAN__JAEGER",
            ]))
            .build()
            .expect("failed to build env collector settings"),
    );
}
