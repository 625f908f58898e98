//! Encode/decode commands - share tokens from the command line.

use std::path::Path;

use atclayer::Category;

use super::start_app;
use crate::error::CliError;

/// One parsed `domain/facility/category/item[=pos,...]` selection.
#[derive(Debug, PartialEq)]
struct Selection {
    domain: String,
    facility: String,
    category: Category,
    item: String,
    /// `Some` only for sector selections listing explicit positions.
    positions: Option<Vec<String>>,
}

fn parse_selection(raw: &str) -> Result<Selection, CliError> {
    let (path, positions) = match raw.split_once('=') {
        Some((path, list)) => {
            let positions: Vec<String> = list
                .split(',')
                .map(str::trim)
                .filter(|p| !p.is_empty())
                .map(str::to_string)
                .collect();
            (path, Some(positions))
        }
        None => (raw, None),
    };

    let parts: Vec<&str> = path.splitn(4, '/').collect();
    if parts.len() != 4 {
        return Err(CliError::Usage(format!(
            "invalid selection {:?}: expected domain/facility/category/item[=pos,...]",
            raw
        )));
    }
    let category = Category::from_segment(parts[2]).ok_or_else(|| {
        CliError::Usage(format!(
            "invalid selection {:?}: unknown category {:?}",
            raw, parts[2]
        ))
    })?;
    if positions.is_some() && category != Category::Sectors {
        return Err(CliError::Usage(format!(
            "invalid selection {:?}: positions only apply to sectors",
            raw
        )));
    }

    Ok(Selection {
        domain: parts[0].to_string(),
        facility: parts[1].to_string(),
        category,
        item: parts[3].to_string(),
        positions,
    })
}

/// Run the encode command: apply selections, print the resulting token.
pub async fn encode(data: &Path, selections: &[String]) -> Result<(), CliError> {
    let parsed = selections
        .iter()
        .map(|raw| parse_selection(raw))
        .collect::<Result<Vec<_>, _>>()?;

    let (mut app, _report) = start_app(data).await?;

    for selection in &parsed {
        let found = match &selection.positions {
            Some(positions) if !positions.is_empty() => positions.iter().all(|position| {
                app.set_position_visible(
                    &selection.domain,
                    &selection.facility,
                    &selection.item,
                    position,
                    true,
                )
            }),
            _ => app.set_item_visible(
                &selection.domain,
                &selection.facility,
                selection.category,
                &selection.item,
                true,
            ),
        };
        if !found {
            tracing::warn!(
                domain = %selection.domain,
                facility = %selection.facility,
                item = %selection.item,
                "selection does not match a loaded layer"
            );
        }
    }

    match app.current_token() {
        Some(token) => println!("{}", token),
        None => println!("(empty selection - no token)"),
    }
    Ok(())
}

/// Run the decode command: apply a token, list the canonical selection.
pub async fn decode(data: &Path, token: &str) -> Result<(), CliError> {
    let (mut app, _report) = start_app(data).await?;
    let achieved = app.apply_token(token);

    if achieved.is_empty() {
        println!("(empty selection)");
        return Ok(());
    }

    for (domain, domain_state) in &achieved.domains {
        for (facility, selection) in &domain_state.facilities {
            for (item, positions) in &selection.sectors {
                let list: Vec<&str> = positions.iter().map(String::as_str).collect();
                println!("{}/{}/sectors/{} [{}]", domain, facility, item, list.join(", "));
            }
            for item in &selection.stars {
                println!("{}/{}/stars/{}", domain, facility, item);
            }
            for item in &selection.sids {
                println!("{}/{}/sids/{}", domain, facility, item);
            }
            for item in &selection.videomaps {
                println!("{}/{}/videomap/{}", domain, facility, item);
            }
        }
    }

    if let Some(canonical) = app.current_token() {
        if canonical != token {
            println!("canonical token: {}", canonical);
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_item_selection() {
        let s = parse_selection("tracon/jfk/stars/parch").unwrap();
        assert_eq!(s.domain, "tracon");
        assert_eq!(s.facility, "jfk");
        assert_eq!(s.category, Category::Stars);
        assert_eq!(s.item, "parch");
        assert_eq!(s.positions, None);
    }

    #[test]
    fn test_parse_sector_positions() {
        let s = parse_selection("tracon/jfk/sectors/JFK_4s=N, S").unwrap();
        assert_eq!(s.category, Category::Sectors);
        assert_eq!(s.positions, Some(vec!["N".to_string(), "S".to_string()]));
    }

    #[test]
    fn test_parse_rejects_bad_input() {
        assert!(parse_selection("jfk/sectors/x").is_err());
        assert!(parse_selection("tracon/jfk/nope/x").is_err());
        assert!(parse_selection("tracon/jfk/stars/parch=N").is_err());
    }
}
