//! Shared test helpers for configuration tests.

use ortho_config::MergeComposer;
use serde_json::Value;

use crate::ExportConfig;

/// Configuration source, listed from lowest to highest precedence.
#[derive(Debug, Clone, Copy)]
pub enum Source {
    Defaults,
    File,
    Environment,
    Cli,
}

/// Merges `(source, value)` pairs into an [`ExportConfig`] in the given order.
pub fn merge(layers: &[(Source, Value)]) -> ExportConfig {
    let mut composer = MergeComposer::new();
    for (source, value) in layers {
        let layer = value.clone();
        match source {
            Source::Defaults => composer.push_defaults(layer),
            Source::File => composer.push_file(layer, None),
            Source::Environment => composer.push_environment(layer),
            Source::Cli => composer.push_cli(layer),
        }
    }
    ExportConfig::merge_from_layers(composer.layers()).expect("merge should succeed")
}
