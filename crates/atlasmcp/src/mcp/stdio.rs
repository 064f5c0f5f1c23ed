use crate::prelude::{eprintln, *};
use tokio::io::{AsyncBufRead, AsyncBufReadExt, AsyncWrite, AsyncWriteExt, BufReader};

use super::Context;

pub async fn run_stdio(context: Context) -> Result<()> {
    if context.global.verbose {
        eprintln!("Serving Jira and Confluence tools on stdio...");
        eprintln!();
    }

    let served = serve_lines(
        BufReader::new(tokio::io::stdin()),
        tokio::io::stdout(),
        &context,
    )
    .await?;

    log::debug!("stdin closed after {served} responses");

    Ok(())
}

/// Answer newline-delimited JSON-RPC messages until `input` hits EOF.
///
/// Blank lines and notifications produce no output. Returns the number of
/// responses written.
async fn serve_lines<R, W>(input: R, mut output: W, context: &Context) -> Result<usize>
where
    R: AsyncBufRead + Unpin,
    W: AsyncWrite + Unpin,
{
    let mut lines = input.lines();
    let mut served = 0;

    while let Some(line) = lines.next_line().await? {
        let message = line.trim();
        if message.is_empty() {
            continue;
        }

        if context.global.verbose {
            eprintln!("<- {message}");
        }

        let Some(response) = super::handle_request(message, context).await else {
            continue;
        };

        let mut encoded = serde_json::to_vec(&response)?;
        if context.global.verbose {
            eprintln!("-> {}", String::from_utf8_lossy(&encoded));
        }
        encoded.push(b'\n');

        output.write_all(&encoded).await?;
        output.flush().await?;
        served += 1;
    }

    Ok(served)
}
