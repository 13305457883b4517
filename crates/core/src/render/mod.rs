use std::ffi::OsString;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::catalog::RenderSource;
use crate::device::DeviceHandle;
use crate::process::{run_command, CommandOutcome};

/// External rendering and display toolchain. Every call is best effort and
/// reports how it went instead of failing.
#[allow(async_fn_in_trait)]
pub trait Toolchain {
    /// Lists known devices, one per line.
    async fn devices(&self) -> CommandOutcome;

    /// Renders `source` in profiling mode; the report is on stdout.
    async fn profile(&self, source: &RenderSource) -> CommandOutcome;

    /// Renders `source` into the image file at `asset`.
    async fn render(&self, source: &RenderSource, asset: &Path) -> CommandOutcome;

    /// Sends the image at `asset` to `device`.
    async fn push(&self, device: &DeviceHandle, asset: &Path) -> CommandOutcome;
}

/// [`Toolchain`] backed by the `pixlet` command line tool.
#[derive(Debug, Clone)]
pub struct PixletToolchain {
    binary: PathBuf,
    timeout: Option<Duration>,
}

impl Default for PixletToolchain {
    fn default() -> Self {
        Self::new("pixlet")
    }
}

impl PixletToolchain {
    pub fn new(binary: impl Into<PathBuf>) -> Self {
        Self {
            binary: binary.into(),
            timeout: None,
        }
    }

    pub fn with_timeout(mut self, timeout: Option<Duration>) -> Self {
        self.timeout = timeout;
        self
    }

    async fn run(&self, args: Vec<OsString>) -> CommandOutcome {
        run_command(&self.binary, &args, self.timeout).await
    }
}

impl Toolchain for PixletToolchain {
    async fn devices(&self) -> CommandOutcome {
        self.run(vec!["devices".into()]).await
    }

    async fn profile(&self, source: &RenderSource) -> CommandOutcome {
        self.run(profile_args(source)).await
    }

    async fn render(&self, source: &RenderSource, asset: &Path) -> CommandOutcome {
        self.run(render_args(source, asset)).await
    }

    async fn push(&self, device: &DeviceHandle, asset: &Path) -> CommandOutcome {
        self.run(push_args(device, asset)).await
    }
}

fn source_args(subcommand: &str, source: &RenderSource) -> Vec<OsString> {
    let mut args = vec![OsString::from(subcommand), source.path.clone().into()];
    args.extend(source.args.iter().map(OsString::from));
    args
}

fn profile_args(source: &RenderSource) -> Vec<OsString> {
    source_args("profile", source)
}

fn render_args(source: &RenderSource, asset: &Path) -> Vec<OsString> {
    let mut args = source_args("render", source);
    args.push("--output".into());
    args.push(asset.into());
    args
}

fn push_args(device: &DeviceHandle, asset: &Path) -> Vec<OsString> {
    vec!["push".into(), device.as_str().into(), asset.into()]
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source() -> RenderSource {
        RenderSource::parse("../fireflies/fireflies.star", "glow=15 color=#FFFF00").unwrap()
    }

    #[test]
    fn render_passes_each_argument_separately() {
        let args = render_args(&source(), Path::new("../fireflies/fireflies.webp"));
        assert_eq!(
            args,
            [
                "render",
                "../fireflies/fireflies.star",
                "glow=15",
                "color=#FFFF00",
                "--output",
                "../fireflies/fireflies.webp",
            ]
            .map(OsString::from)
        );
    }

    #[test]
    fn profile_and_push_arguments() {
        assert_eq!(profile_args(&source())[0], "profile");
        assert_eq!(profile_args(&source()).len(), 4);

        let device = DeviceHandle::new("tidy-kitchen-42");
        let args = push_args(&device, Path::new("out.webp"));
        assert_eq!(args, ["push", "tidy-kitchen-42", "out.webp"].map(OsString::from));
    }

    #[test]
    fn argument_with_shell_metacharacters_stays_one_token() {
        let src = RenderSource::parse("app.star", "msg=a;rm").unwrap();
        let args = profile_args(&src);
        assert_eq!(args.last().unwrap(), "msg=a;rm");
    }

    #[tokio::test]
    async fn missing_binary_reports_not_found() {
        let toolchain = PixletToolchain::new("pixcycle-no-such-pixlet")
            .with_timeout(Some(Duration::from_secs(5)));
        assert_eq!(toolchain.devices().await, CommandOutcome::NotFound);
    }
}
