//! Scripted user input for the headless run. Each entry is stamped with the
//! session time (milliseconds) at which it is delivered.

use std::time::Duration;

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InputAction {
    Pointer { x: f32, y: f32 },
    Click,
    ToggleAutospin,
    Restart,
    Resize { width: f32, height: f32 },
    Footer { height: f32 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScriptedInput {
    pub at: Duration,
    pub action: InputAction,
}

fn parse_ms(value: &str) -> Result<Duration, String> {
    value
        .trim()
        .parse::<u64>()
        .map(Duration::from_millis)
        .map_err(|err| format!("invalid time '{value}': {err}"))
}

fn parse_f32(value: &str, what: &str) -> Result<f32, String> {
    let parsed = value
        .trim()
        .parse::<f32>()
        .map_err(|err| format!("invalid {what} '{value}': {err}"))?;
    if parsed.is_finite() {
        Ok(parsed)
    } else {
        Err(format!("{what} must be finite"))
    }
}

/// `AT_MS:X:Y`
pub fn parse_pointer(value: &str) -> Result<ScriptedInput, String> {
    let parts: Vec<&str> = value.split(':').collect();
    let [at, x, y] = parts.as_slice() else {
        return Err(format!("expected AT_MS:X:Y, got '{value}'"));
    };
    Ok(ScriptedInput {
        at: parse_ms(at)?,
        action: InputAction::Pointer {
            x: parse_f32(x, "x")?,
            y: parse_f32(y, "y")?,
        },
    })
}

/// `AT_MS:WIDTHxHEIGHT`
pub fn parse_resize(value: &str) -> Result<ScriptedInput, String> {
    let (at, size) = value
        .split_once(':')
        .ok_or_else(|| format!("expected AT_MS:WIDTHxHEIGHT, got '{value}'"))?;
    let (width, height) = size
        .split_once('x')
        .ok_or_else(|| format!("expected WIDTHxHEIGHT, got '{size}'"))?;
    let width = parse_f32(width, "width")?;
    let height = parse_f32(height, "height")?;
    if width <= 0.0 || height <= 0.0 {
        return Err(format!("resize to {width}x{height} is empty"));
    }
    Ok(ScriptedInput {
        at: parse_ms(at)?,
        action: InputAction::Resize { width, height },
    })
}

/// `AT_MS:HEIGHT`
pub fn parse_footer(value: &str) -> Result<ScriptedInput, String> {
    let (at, height) = value
        .split_once(':')
        .ok_or_else(|| format!("expected AT_MS:HEIGHT, got '{value}'"))?;
    Ok(ScriptedInput {
        at: parse_ms(at)?,
        action: InputAction::Footer {
            height: parse_f32(height, "footer height")?.max(0.0),
        },
    })
}

pub fn parse_at(value: &str) -> Result<Duration, String> {
    parse_ms(value)
}

/// Stable time-ordered queue of scripted inputs.
#[derive(Debug, Clone, Default)]
pub struct InputScript {
    pending: Vec<ScriptedInput>,
    cursor: usize,
}

impl InputScript {
    pub fn new<I>(inputs: I) -> Self
    where
        I: IntoIterator<Item = ScriptedInput>,
    {
        let mut pending: Vec<ScriptedInput> = inputs.into_iter().collect();
        pending.sort_by_key(|input| input.at);
        Self { pending, cursor: 0 }
    }

    /// Inputs due at or before `now` that have not been delivered yet.
    pub fn due(&mut self, now: Duration) -> &[ScriptedInput] {
        let start = self.cursor;
        while self.cursor < self.pending.len() && self.pending[self.cursor].at <= now {
            self.cursor += 1;
        }
        &self.pending[start..self.cursor]
    }

    pub fn remaining(&self) -> usize {
        self.pending.len() - self.cursor
    }
}
