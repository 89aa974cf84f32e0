/// Provides the recommended log filter for programs which use the blocktrace libraries.
///
/// The guiding principle is that at [`log::Level::Debug`] or lower level, there should be
/// no messages produced per path or per shadow ray unless something is wrong. The integrator
/// and light sampler log such detail at [`log::Level::Trace`], which this drops.
#[allow(clippy::missing_inline_in_public_items)]
pub fn standard_filter(metadata: &log::Metadata<'_>) -> bool {
    let target = metadata.target();

    let per_path = target.starts_with("blocktrace::integrator")
        || target.starts_with("blocktrace::light");

    !(per_path && metadata.level() >= log::Level::Trace)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn meta(target: &str, level: log::Level) -> log::Metadata<'_> {
        log::Metadata::builder().target(target).level(level).build()
    }

    #[test]
    fn filter() {
        assert!(!standard_filter(&meta(
            "blocktrace::integrator",
            log::Level::Trace
        )));
        assert!(!standard_filter(&meta(
            "blocktrace::light::emitters",
            log::Level::Trace
        )));
        assert!(standard_filter(&meta(
            "blocktrace::integrator",
            log::Level::Warn
        )));
        assert!(standard_filter(&meta("blocktrace::render", log::Level::Trace)));
        assert!(standard_filter(&meta("some_random_crate", log::Level::Debug)));
    }
}
