use std::io::BufRead;

use log::trace;

use super::line::{LineKind, classify_line};
use super::model::{Block, Sample, Stream};
use crate::error::DataError;

/// Read every line of `input` and group the data lines into blocks.
///
/// Blank lines close the current block only when it holds samples, so
/// leading, trailing and repeated blank lines never produce empty blocks.
/// Comment lines are skipped without touching the block structure.
pub fn segment<R: BufRead>(input: R) -> Result<Stream, DataError> {
    let mut stream = Stream::new();
    let mut current = Block::new();

    for (index, line) in input.lines().enumerate() {
        let line = line?;
        let line_no = index + 1;

        match classify_line(&line) {
            LineKind::Comment => continue,
            LineKind::Blank => {
                if !current.is_empty() {
                    trace!("block {} closed at line {line_no}", stream.len());
                    stream.push(std::mem::take(&mut current));
                }
            }
            LineKind::Data => current.push(parse_sample(&line, line_no)?),
        }
    }

    if !current.is_empty() {
        stream.push(current);
    }
    Ok(stream)
}

/// `<label> <v1> ... <vn>`, whitespace separated.
fn parse_sample(line: &str, line_no: usize) -> Result<Sample, DataError> {
    let mut tokens = line.split_whitespace();
    // Data lines always carry at least one token.
    let label = tokens.next().unwrap_or_default();

    let values = tokens
        .map(|tok| {
            tok.parse::<f64>().map_err(|_| DataError::Parse {
                line: line_no,
                token: tok.to_string(),
            })
        })
        .collect::<Result<Vec<_>, _>>()?;

    Ok(Sample::new(label, values))
}
