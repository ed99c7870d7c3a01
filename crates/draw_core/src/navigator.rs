use std::{io::Write, process::Command};

use anyhow::{anyhow, Context, Result};
use tracing::info;

/// Terminal side effect of a successful draw.
pub trait Navigator: Send + Sync {
    fn open(&self, url: &str) -> Result<()>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Platform {
    Windows,
    MacOs,
    Unix,
}

impl Platform {
    fn current() -> Option<Self> {
        if cfg!(target_os = "windows") {
            Some(Self::Windows)
        } else if cfg!(target_os = "macos") {
            Some(Self::MacOs)
        } else if cfg!(unix) {
            Some(Self::Unix)
        } else {
            None
        }
    }
}

/// The URL is always a single argv entry; no shell parses it.
fn opener_command(platform: Platform, url: &str) -> Command {
    let mut command = match platform {
        Platform::Windows => {
            let mut command = Command::new("rundll32");
            command.arg("url.dll,FileProtocolHandler");
            command
        }
        Platform::MacOs => Command::new("open"),
        Platform::Unix => Command::new("xdg-open"),
    };
    command.arg(url);
    command
}

/// Hands the URL to the platform's default handler.
#[derive(Debug, Default, Clone, Copy)]
pub struct SystemNavigator;

impl Navigator for SystemNavigator {
    fn open(&self, url: &str) -> Result<()> {
        let platform = Platform::current()
            .ok_or_else(|| anyhow!("no default URL handler on this platform"))?;
        opener_command(platform, url)
            .spawn()
            .with_context(|| format!("failed to launch URL handler for '{url}'"))?;
        info!(%url, ?platform, "navigate: handed off to system handler");
        Ok(())
    }
}

/// Writes the URL to stdout instead of opening it.
#[derive(Debug, Default, Clone, Copy)]
pub struct PrintNavigator;

impl Navigator for PrintNavigator {
    fn open(&self, url: &str) -> Result<()> {
        let mut stdout = std::io::stdout().lock();
        writeln!(stdout, "{url}").context("failed to write URL to stdout")?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::ffi::OsStr;

    fn argv(command: &Command) -> (String, Vec<String>) {
        (
            command.get_program().to_string_lossy().into_owned(),
            command
                .get_args()
                .map(|arg| arg.to_string_lossy().into_owned())
                .collect(),
        )
    }

    #[test]
    fn windows_passes_url_to_rundll32_without_a_shell() {
        let url = "https://a.test/?x=1&calc";
        let (program, args) = argv(&opener_command(Platform::Windows, url));
        assert_eq!(program, "rundll32");
        assert_eq!(args, vec!["url.dll,FileProtocolHandler", url]);
    }

    #[test]
    fn shell_metacharacters_stay_in_one_argument() {
        let url = "https://a.test/?q=a&b|c^d\"e\" f";
        for platform in [Platform::Windows, Platform::MacOs, Platform::Unix] {
            let command = opener_command(platform, url);
            assert_ne!(command.get_program(), OsStr::new("cmd"));
            assert_eq!(command.get_args().last(), Some(OsStr::new(url)));
        }
    }

    #[test]
    fn unix_like_platforms_use_their_openers() {
        let url = "https://example.com/";
        assert_eq!(
            argv(&opener_command(Platform::MacOs, url)),
            ("open".to_string(), vec![url.to_string()])
        );
        assert_eq!(
            argv(&opener_command(Platform::Unix, url)),
            ("xdg-open".to_string(), vec![url.to_string()])
        );
    }
}
