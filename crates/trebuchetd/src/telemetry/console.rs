//! Console line format driven by the `Log` settings namespace.
//!
//! Lines render as ` <header> <body>`. The header is the configured template
//! with `@time` and `@type` substituted; error-level bodies are always red.

use std::fmt;

use anstyle::{AnsiColor, Color, Style};
use time::OffsetDateTime;
use time::format_description::well_known::Rfc3339;
use tracing::{Event, Level, Subscriber};
use tracing_subscriber::fmt::format::Writer;
use tracing_subscriber::fmt::{FmtContext, FormatEvent, FormatFields};
use tracing_subscriber::registry::LookupSpan;

use trebuchet_config::{ConsoleColor, ConsoleSettings};

const CRITICAL_COLOR: ConsoleColor = ConsoleColor::Red;

/// Event formatter rendering the configured header and body colours.
#[derive(Debug, Clone)]
pub(crate) struct ConsoleFormat {
    settings: ConsoleSettings,
}

impl ConsoleFormat {
    pub(crate) const fn new(settings: ConsoleSettings) -> Self {
        Self { settings }
    }

    fn body_color(&self, level: Level) -> ConsoleColor {
        if level == Level::ERROR {
            CRITICAL_COLOR
        } else {
            self.settings.body_color
        }
    }
}

/// Maps the sixteen-colour console palette onto ANSI colours.
pub(crate) const fn ansi_color(color: ConsoleColor) -> AnsiColor {
    match color {
        ConsoleColor::Black => AnsiColor::Black,
        ConsoleColor::DarkBlue => AnsiColor::Blue,
        ConsoleColor::DarkGreen => AnsiColor::Green,
        ConsoleColor::DarkCyan => AnsiColor::Cyan,
        ConsoleColor::DarkRed => AnsiColor::Red,
        ConsoleColor::DarkMagenta => AnsiColor::Magenta,
        ConsoleColor::DarkYellow => AnsiColor::Yellow,
        ConsoleColor::Gray => AnsiColor::White,
        ConsoleColor::DarkGray => AnsiColor::BrightBlack,
        ConsoleColor::Blue => AnsiColor::BrightBlue,
        ConsoleColor::Green => AnsiColor::BrightGreen,
        ConsoleColor::Cyan => AnsiColor::BrightCyan,
        ConsoleColor::Red => AnsiColor::BrightRed,
        ConsoleColor::Magenta => AnsiColor::BrightMagenta,
        ConsoleColor::Yellow => AnsiColor::BrightYellow,
        ConsoleColor::White => AnsiColor::BrightWhite,
    }
}

const fn style(color: ConsoleColor) -> Style {
    Style::new().fg_color(Some(Color::Ansi(ansi_color(color))))
}

/// Last `::` segment of an event target, e.g. `listener`.
fn origin(target: &str) -> &str {
    target.rsplit("::").next().unwrap_or(target)
}

fn timestamp() -> String {
    OffsetDateTime::now_utc()
        .format(&Rfc3339)
        .unwrap_or_else(|_| String::from("-"))
}

impl<S, N> FormatEvent<S, N> for ConsoleFormat
where
    S: Subscriber + for<'a> LookupSpan<'a>,
    N: for<'a> FormatFields<'a> + 'static,
{
    fn format_event(
        &self,
        ctx: &FmtContext<'_, S, N>,
        mut writer: Writer<'_>,
        event: &Event<'_>,
    ) -> fmt::Result {
        let metadata = event.metadata();
        let header = self
            .settings
            .render_header(&timestamp(), origin(metadata.target()));
        let ansi = writer.has_ansi_escapes();

        writer.write_char(' ')?;
        if ansi {
            let header_style = style(self.settings.header_color);
            write!(
                writer,
                "{}{header}{}",
                header_style.render(),
                header_style.render_reset()
            )?;
        } else {
            writer.write_str(&header)?;
        }
        writer.write_char(' ')?;

        let body_style = style(self.body_color(*metadata.level()));
        if ansi {
            write!(writer, "{}", body_style.render())?;
        }
        ctx.field_format().format_fields(writer.by_ref(), event)?;
        if ansi {
            write!(writer, "{}", body_style.render_reset())?;
        }
        writeln!(writer)
    }
}

#[cfg(test)]
mod tests {
    use std::io;
    use std::sync::{Arc, Mutex};

    use rstest::rstest;
    use tracing_subscriber::fmt;

    use super::*;

    #[derive(Clone, Default)]
    struct Buffer(Arc<Mutex<Vec<u8>>>);

    impl Buffer {
        fn contents(&self) -> String {
            let bytes = self.0.lock().expect("buffer mutex poisoned").clone();
            String::from_utf8(bytes).expect("log output is UTF-8")
        }
    }

    impl io::Write for Buffer {
        fn write(&mut self, bytes: &[u8]) -> io::Result<usize> {
            self.0
                .lock()
                .expect("buffer mutex poisoned")
                .extend_from_slice(bytes);
            Ok(bytes.len())
        }

        fn flush(&mut self) -> io::Result<()> {
            Ok(())
        }
    }

    fn capture(settings: ConsoleSettings, ansi: bool, emit: impl FnOnce()) -> String {
        let buffer = Buffer::default();
        let sink = buffer.clone();
        let subscriber = fmt::Subscriber::builder()
            .with_writer(move || sink.clone())
            .with_ansi(ansi)
            .event_format(ConsoleFormat::new(settings))
            .finish();
        tracing::subscriber::with_default(subscriber, emit);
        buffer.contents()
    }

    #[rstest]
    #[case("trebuchetd::listener", "listener")]
    #[case("trebuchetd", "trebuchetd")]
    #[case("a::b::c", "c")]
    fn origin_is_the_last_target_segment(#[case] target: &str, #[case] expected: &str) {
        assert_eq!(origin(target), expected);
    }

    #[test]
    fn plain_lines_render_header_then_body() {
        let settings = ConsoleSettings {
            header_template: "<@type>".to_owned(),
            ..ConsoleSettings::default()
        };
        let output = capture(settings, false, || {
            tracing::info!(target: "trebuchetd::listener", "listening on 0.0.0.0:9000");
        });
        assert_eq!(output, " <listener> listening on 0.0.0.0:9000\n");
    }

    #[test]
    fn header_time_placeholder_is_rfc3339() {
        let output = capture(ConsoleSettings::default(), false, || {
            tracing::info!(target: "trebuchetd::health", "ready");
        });
        let header = output
            .trim_start()
            .split(' ')
            .next()
            .expect("header present");
        let time = header.trim_start_matches('[').trim_end_matches(']');
        assert!(OffsetDateTime::parse(time, &Rfc3339).is_ok(), "{output}");
        assert!(output.ends_with("] health ready\n"), "{output}");
    }

    #[test]
    fn critical_lines_are_red_on_terminals() {
        let settings = ConsoleSettings {
            header_template: "@type".to_owned(),
            ..ConsoleSettings::default()
        };
        let output = capture(settings, true, || {
            tracing::error!(target: "trebuchetd::registry", "boom");
        });
        let red = style(CRITICAL_COLOR).render().to_string();
        let header = style(ConsoleColor::DarkCyan).render().to_string();
        assert!(output.contains(&format!("{red}boom")), "{output:?}");
        assert!(output.contains(&format!("{header}registry")), "{output:?}");
    }

    #[test]
    fn info_lines_use_the_body_colour() {
        let settings = ConsoleSettings {
            body_color: ConsoleColor::Green,
            ..ConsoleSettings::default()
        };
        let output = capture(settings, true, || {
            tracing::info!(target: "trebuchetd::registry", "fine");
        });
        let green = style(ConsoleColor::Green).render().to_string();
        assert!(output.contains(&format!("{green}fine")), "{output:?}");
    }

    #[test]
    fn palette_maps_dark_variants_to_normal_intensity() {
        assert_eq!(ansi_color(ConsoleColor::DarkRed), AnsiColor::Red);
        assert_eq!(ansi_color(ConsoleColor::Red), AnsiColor::BrightRed);
        assert_eq!(ansi_color(ConsoleColor::Gray), AnsiColor::White);
    }
}
