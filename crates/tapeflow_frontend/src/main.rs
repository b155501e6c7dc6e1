//! Tapeflow admin frontend binary.
//!
//! Runs one admin request against a JSON state file and prints every frame
//! of the response as a JSON line on stdout.

use std::io::{self, Write};
use std::process::ExitCode;
use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use serde_json::json;
use tapeflow_catalogue::MemoryBackend;
use tapeflow_frontend::transport::{ChannelWriter, HostEvent};
use tapeflow_frontend::{
    CommandRegistry, FrontendArgs, FrontendContext, PullAdapter, PushAdapter, PushOutcome,
    PushStep, ResponseStream, TransportMode, METRICS,
};
use tapeflow_logging::{init_logging, LogConfig};
use tapeflow_protocol::{AdminRequest, Frame, FrameKind};
use tracing::{error, info};

/// The binary serves one request, so one stream id is enough.
const STREAM_ID: u64 = 1;

#[derive(Parser, Debug)]
#[command(name = "tapeflow-frontend", about = "Stream one Tapeflow admin listing")]
struct Cli {
    #[command(flatten)]
    args: FrontendArgs,
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(err) = init_logging(LogConfig {
        app_name: "tapeflow-frontend",
        verbose: cli.args.verbose,
        log_dir: None,
    }) {
        eprintln!("Warning: logging disabled: {:#}", err);
    }

    let code = match run(&cli.args) {
        Ok(true) => ExitCode::SUCCESS,
        Ok(false) => ExitCode::FAILURE,
        Err(err) => {
            error!("{:#}", err);
            eprintln!("Error: {:#}", err);
            ExitCode::FAILURE
        }
    };
    info!("{}", METRICS.snapshot().summary());
    code
}

/// Returns whether the stream ended in success.
fn run(args: &FrontendArgs) -> Result<bool> {
    let backend = MemoryBackend::load(&args.state)
        .with_context(|| format!("Failed to load state file {}", args.state.display()))?;

    let mut ctx = FrontendContext::from_backend(Arc::new(backend));
    if let Some(name) = &args.instance_name {
        ctx = ctx.with_instance_name(name.clone());
    }
    if let Some(name) = &args.backend_name {
        ctx = ctx.with_backend_name(name.clone());
    }

    let request: AdminRequest =
        serde_json::from_str(&args.request).context("Invalid --request JSON")?;

    let stdout = io::stdout();
    let mut out = stdout.lock();

    let stream = match CommandRegistry::standard().open(&ctx, &request) {
        Ok(stream) => stream,
        Err(err) => {
            // Rejected before any frame: report it the way a host would
            let frame = Frame::failure(STREAM_ID, err.code(), &err.to_string())?;
            print_frame(&mut out, &frame)?;
            return Ok(false);
        }
    };

    match args.transport {
        TransportMode::Pull => run_pull(&mut out, stream, args.fill_hint),
        TransportMode::Push => run_push(&mut out, stream),
    }
}

fn run_pull(out: &mut impl Write, stream: ResponseStream, hint: usize) -> Result<bool> {
    let mut adapter = PullAdapter::new(stream, STREAM_ID);
    loop {
        match adapter.fill(hint) {
            Ok(chunk) => {
                for frame in Frame::decode_all(&chunk.data)? {
                    print_frame(out, &frame)?;
                }
                if chunk.end_of_stream {
                    print_frame(out, &adapter.success_frame()?)?;
                    return Ok(true);
                }
            }
            Err(err) => {
                print_frame(out, &adapter.failure_frame(&err)?)?;
                return Ok(false);
            }
        }
    }
}

fn run_push(out: &mut impl Write, stream: ResponseStream) -> Result<bool> {
    let (writer, events) = ChannelWriter::new();
    let mut step = PushAdapter::start(stream, Box::new(writer), STREAM_ID);

    let outcome = loop {
        // Flush whatever the last action wrote before reporting completion
        for event in events.try_iter() {
            match event {
                HostEvent::Frame(frame) | HostEvent::Finish(frame) => print_frame(out, &frame)?,
            }
        }
        match step {
            PushStep::Pending(adapter) => step = adapter.on_write_done(Ok(())),
            PushStep::Finished(outcome) => break outcome,
        }
    };

    Ok(matches!(outcome, PushOutcome::Success { .. }))
}

fn print_frame(out: &mut impl Write, frame: &Frame) -> Result<()> {
    let line = match frame.kind() {
        FrameKind::Header | FrameKind::Data => serde_json::to_value(frame.to_record()?)?,
        FrameKind::Success => json!({ "success": frame.to_success()? }),
        FrameKind::Failure => json!({ "failure": frame.to_error()? }),
    };
    writeln!(out, "{}", line).context("Failed to write to stdout")?;
    Ok(())
}
