//! CLI argument parsing tests.
//!
//! These tests verify that command-line arguments are parsed correctly
//! without actually executing the commands (which would require a live target process).

use clap::Parser;

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
enum Mode {
    Gray,
    Jet,
    Hot,
    Cool,
    Hsv,
    Rainbow,
}

// Re-create Args structure for testing since it's not publicly exported
#[derive(Parser)]
#[command(name = "matwatch")]
struct Args {
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand)]
enum Command {
    Inspect {
        #[arg(long, env = "MATWATCH_PID")]
        pid: u32,
        #[arg(long)]
        address: String,
        #[arg(long, value_name = "FILE")]
        layout: Option<String>,
        #[arg(long)]
        json: bool,
    },
    Pixel {
        #[arg(long, env = "MATWATCH_PID")]
        pid: u32,
        #[arg(long)]
        address: String,
        #[arg(long, value_name = "FILE")]
        layout: Option<String>,
        #[arg(long, allow_negative_numbers = true)]
        x: i64,
        #[arg(long, allow_negative_numbers = true)]
        y: i64,
    },
    Watch {
        #[arg(long, env = "MATWATCH_PID")]
        pid: u32,
        #[arg(long)]
        address: String,
        #[arg(long, value_name = "FILE")]
        layout: Option<String>,
        #[arg(long, default_value_t = 500)]
        interval_ms: u64,
        #[arg(long)]
        polls: Option<u64>,
        #[arg(long)]
        no_content: bool,
    },
    Capture {
        #[arg(long, env = "MATWATCH_PID")]
        pid: u32,
        #[arg(long)]
        address: String,
        #[arg(long, value_name = "FILE")]
        layout: Option<String>,
        #[arg(short, long)]
        output: String,
    },
    Colorbar {
        #[arg(long, value_enum, default_value = "jet")]
        mode: Mode,
        #[arg(long, default_value = "256")]
        width: usize,
        #[arg(long, default_value = "16")]
        height: usize,
        #[arg(short, long)]
        output: String,
    },
}

mod inspect_command {
    use super::*;

    #[test]
    fn test_inspect_with_required_args() {
        let args =
            Args::try_parse_from(["matwatch", "inspect", "--pid", "4242", "--address", "0x1000"])
                .unwrap();
        match args.command {
            Command::Inspect {
                pid,
                address,
                layout,
                json,
            } => {
                assert_eq!(pid, 4242);
                assert_eq!(address, "0x1000");
                assert!(layout.is_none());
                assert!(!json);
            }
            _ => panic!("Expected Inspect command"),
        }
    }

    #[test]
    fn test_inspect_json_and_layout() {
        let args = Args::try_parse_from([
            "matwatch",
            "inspect",
            "--pid",
            "1",
            "--address",
            "0x20",
            "--layout",
            "mat.json",
            "--json",
        ])
        .unwrap();
        match args.command {
            Command::Inspect { layout, json, .. } => {
                assert_eq!(layout.as_deref(), Some("mat.json"));
                assert!(json);
            }
            _ => panic!("Expected Inspect command"),
        }
    }

    #[test]
    fn test_inspect_requires_address() {
        let result = Args::try_parse_from(["matwatch", "inspect", "--pid", "1"]);
        assert!(result.is_err());
    }
}

mod pixel_command {
    use super::*;

    #[test]
    fn test_pixel_coordinates() {
        let args = Args::try_parse_from([
            "matwatch", "pixel", "--pid", "7", "--address", "0x40", "--x", "3", "--y", "9",
        ])
        .unwrap();
        match args.command {
            Command::Pixel { x, y, .. } => {
                assert_eq!(x, 3);
                assert_eq!(y, 9);
            }
            _ => panic!("Expected Pixel command"),
        }
    }

    #[test]
    fn test_pixel_accepts_negative_coordinates() {
        let args = Args::try_parse_from([
            "matwatch", "pixel", "--pid", "7", "--address", "0x40", "--x", "-1", "--y", "0",
        ])
        .unwrap();
        match args.command {
            Command::Pixel { x, .. } => assert_eq!(x, -1),
            _ => panic!("Expected Pixel command"),
        }
    }

    #[test]
    fn test_pixel_rejects_non_numeric() {
        let result = Args::try_parse_from([
            "matwatch", "pixel", "--pid", "7", "--address", "0x40", "--x", "left", "--y", "0",
        ]);
        assert!(result.is_err());
    }
}

mod watch_command {
    use super::*;

    #[test]
    fn test_watch_defaults() {
        let args =
            Args::try_parse_from(["matwatch", "watch", "--pid", "9", "--address", "0xABC"]).unwrap();
        match args.command {
            Command::Watch {
                interval_ms,
                polls,
                no_content,
                ..
            } => {
                assert_eq!(interval_ms, 500);
                assert!(polls.is_none());
                assert!(!no_content);
            }
            _ => panic!("Expected Watch command"),
        }
    }

    #[test]
    fn test_watch_with_all_options() {
        let args = Args::try_parse_from([
            "matwatch",
            "watch",
            "--pid",
            "9",
            "--address",
            "0xABC",
            "--interval-ms",
            "50",
            "--polls",
            "10",
            "--no-content",
        ])
        .unwrap();
        match args.command {
            Command::Watch {
                interval_ms,
                polls,
                no_content,
                ..
            } => {
                assert_eq!(interval_ms, 50);
                assert_eq!(polls, Some(10));
                assert!(no_content);
            }
            _ => panic!("Expected Watch command"),
        }
    }
}

mod capture_command {
    use super::*;

    #[test]
    fn test_capture_short_output_flag() {
        let args = Args::try_parse_from([
            "matwatch", "capture", "--pid", "3", "--address", "0x10", "-o", "frame.bgr",
        ])
        .unwrap();
        match args.command {
            Command::Capture { output, .. } => assert_eq!(output, "frame.bgr"),
            _ => panic!("Expected Capture command"),
        }
    }

    #[test]
    fn test_capture_requires_output() {
        let result =
            Args::try_parse_from(["matwatch", "capture", "--pid", "3", "--address", "0x10"]);
        assert!(result.is_err());
    }
}

mod colorbar_command {
    use super::*;

    #[test]
    fn test_colorbar_defaults() {
        let args = Args::try_parse_from(["matwatch", "colorbar", "-o", "bar.bgr"]).unwrap();
        match args.command {
            Command::Colorbar {
                mode,
                width,
                height,
                output,
            } => {
                assert_eq!(mode, Mode::Jet);
                assert_eq!(width, 256);
                assert_eq!(height, 16);
                assert_eq!(output, "bar.bgr");
            }
            _ => panic!("Expected Colorbar command"),
        }
    }

    #[test]
    fn test_colorbar_hot_mode() {
        let args = Args::try_parse_from([
            "matwatch", "colorbar", "--mode", "hot", "--width", "64", "--height", "4", "-o",
            "bar.bgr",
        ])
        .unwrap();
        match args.command {
            Command::Colorbar {
                mode,
                width,
                height,
                ..
            } => {
                assert_eq!(mode, Mode::Hot);
                assert_eq!(width, 64);
                assert_eq!(height, 4);
            }
            _ => panic!("Expected Colorbar command"),
        }
    }

    #[test]
    fn test_colorbar_unknown_mode() {
        let result = Args::try_parse_from(["matwatch", "colorbar", "--mode", "plasma", "-o", "x"]);
        assert!(result.is_err());
    }
}

mod global {
    use super::*;

    #[test]
    fn test_subcommand_required() {
        assert!(Args::try_parse_from(["matwatch"]).is_err());
    }

    #[test]
    fn test_unknown_subcommand() {
        assert!(Args::try_parse_from(["matwatch", "unknown"]).is_err());
    }
}
