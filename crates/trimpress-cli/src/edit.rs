// SPDX-License-Identifier: PMPL-1.0-or-later
// Copyright (c) 2026 Jonathan D.A. Jewell (hyperpolymath) <jonathan.jewell@open.ac.uk>
//
// `--edit` arguments. Pages are numbered from 1 on the command line.

use trimpress_document::Gesture;

/// Parse `up:N`, `down:N`, `delete:N`, or `text:N=new text`.
pub fn parse_edit(raw: &str) -> Result<Gesture, String> {
    let (op, rest) = raw
        .split_once(':')
        .ok_or_else(|| format!("expected OP:PAGE, got {raw:?}"))?;

    match op.trim().to_ascii_lowercase().as_str() {
        "up" => Ok(Gesture::MoveUp {
            index: page_index(rest)?,
        }),
        "down" => Ok(Gesture::MoveDown {
            index: page_index(rest)?,
        }),
        "delete" | "del" | "rm" => Ok(Gesture::Delete {
            index: page_index(rest)?,
        }),
        "text" => {
            let (page, text) = rest
                .split_once('=')
                .ok_or_else(|| format!("expected text:PAGE=TEXT, got {raw:?}"))?;
            Ok(Gesture::SetText {
                index: page_index(page)?,
                text: text.replace("\\n", "\n"),
            })
        }
        other => Err(format!(
            "unknown edit {other:?} (use up, down, delete, or text)"
        )),
    }
}

fn page_index(raw: &str) -> Result<usize, String> {
    match raw.trim().parse::<usize>() {
        Ok(0) => Err("pages are numbered from 1".into()),
        Ok(page) => Ok(page - 1),
        Err(err) => Err(format!("bad page number {raw:?}: {err}")),
    }
}
