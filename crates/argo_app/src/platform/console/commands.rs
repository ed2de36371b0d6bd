use argo_core::{BoundField, Category, Msg, ParamField, Rect};

/// One parsed console line.
#[derive(Debug, Clone, PartialEq)]
pub enum Command {
    /// Messages to feed straight into `update`.
    Dispatch(Vec<Msg>),
    /// User drew a rectangle on the map overlay.
    DrawOverlay(Rect),
    /// User deleted the overlay rectangle.
    ClearOverlay,
    Show,
    Help,
    Quit,
}

pub const HELP: &str = "\
Commands:
  north|south|east|west <deg>     set one bound (empty value clears it)
  bounds <N> <S> <E> <W>          set all four bounds
  overlay <N> <S> <E> <W>         draw the map rectangle
  clear                           delete the map rectangle
  start|end <YYYY-MM-DD>          date range
  min-depth|max-depth <dbar>      depth range (empty value clears it)
  category core|bio               dataset family
  submit | cancel | dismiss       run, abort, or close the result
  show | help | quit";

/// Parses one input line. Blank lines yield `Ok(None)`.
pub fn parse_command(line: &str) -> Result<Option<Command>, String> {
    let line = line.trim();
    if line.is_empty() {
        return Ok(None);
    }
    let (keyword, rest) = match line.split_once(char::is_whitespace) {
        Some((keyword, rest)) => (keyword, rest.trim()),
        None => (line, ""),
    };

    let command = match keyword.to_ascii_lowercase().as_str() {
        "submit" | "search" => Command::Dispatch(vec![Msg::SubmitClicked]),
        "cancel" => Command::Dispatch(vec![Msg::CancelClicked]),
        "dismiss" | "close" => Command::Dispatch(vec![Msg::DismissClicked]),
        "clear" => Command::ClearOverlay,
        "show" | "status" => Command::Show,
        "help" | "?" => Command::Help,
        "quit" | "exit" | "q" => Command::Quit,
        "category" | "type" => {
            let category: Category = rest.parse()?;
            Command::Dispatch(vec![Msg::CategorySelected(category)])
        }
        "overlay" | "draw" => {
            let [north, south, east, west] = four_numbers(rest)?;
            let rect = Rect::new(north, south, east, west);
            if !rect.is_valid() {
                return Err("overlay needs north > south and east > west".to_string());
            }
            Command::DrawOverlay(rect)
        }
        "bounds" => {
            let values: Vec<&str> = rest.split_whitespace().collect();
            if values.len() != 4 {
                return Err("usage: bounds <N> <S> <E> <W>".to_string());
            }
            let msgs = BoundField::ALL
                .iter()
                .zip(values)
                .map(|(field, raw)| Msg::BoundFieldEdited {
                    field: *field,
                    raw: raw.to_string(),
                })
                .collect();
            Command::Dispatch(msgs)
        }
        other => {
            if let Ok(field) = other.parse::<BoundField>() {
                Command::Dispatch(vec![Msg::BoundFieldEdited {
                    field,
                    raw: rest.to_string(),
                }])
            } else if let Ok(field) = other.parse::<ParamField>() {
                Command::Dispatch(vec![Msg::ParamEdited {
                    field,
                    raw: rest.to_string(),
                }])
            } else {
                return Err(format!("unknown command '{other}', try 'help'"));
            }
        }
    };
    Ok(Some(command))
}

fn four_numbers(rest: &str) -> Result<[f64; 4], String> {
    let values = rest
        .split_whitespace()
        .map(|raw| {
            raw.parse::<f64>()
                .ok()
                .filter(|value| value.is_finite())
                .ok_or_else(|| format!("'{raw}' is not a number"))
        })
        .collect::<Result<Vec<_>, _>>()?;
    values
        .try_into()
        .map_err(|_| "expected four numbers: <N> <S> <E> <W>".to_string())
}
