//! The `imtag classifiers` command.

use imtag_core::classifier::ClassifierRegistry;
use imtag_core::Config;

/// List built-in classifiers and whether their files are installed.
pub fn execute(config: &Config) -> anyhow::Result<()> {
    let registry = ClassifierRegistry::builtin();
    let data_dir = config.data_dir();

    println!("Classifiers:");
    println!("  Directory: {}\n", data_dir.display());

    for descriptor in registry.descriptors() {
        let status = if descriptor.is_available(&data_dir) {
            "installed"
        } else {
            "missing"
        };
        let default_marker = if descriptor.name.eq_ignore_ascii_case(&config.classifier.name) {
            " (configured)"
        } else {
            ""
        };
        println!(
            "  - {:16} {:10} {} labels, {}x{}{}",
            descriptor.name,
            status,
            descriptor.num_labels,
            descriptor.input_size,
            descriptor.input_size,
            default_marker
        );
        if status == "missing" {
            println!(
                "      needs {} and {}",
                descriptor.model_file, descriptor.labels_file
            );
        }
    }

    Ok(())
}
