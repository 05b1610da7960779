use crate::services::mpris::PlayerId;

/// Round-robin scan for the next available player.
///
/// Scans forward from the slot after `pivot`, then wraps around from the
/// start up to (not including) the pivot. Without a pivot, or with one that
/// is not in `players`, the whole list is scanned from the start.
pub(crate) fn select_next<'a>(
    players: &'a [PlayerId],
    pivot: Option<&PlayerId>,
    is_available: impl Fn(&PlayerId) -> bool,
) -> Option<&'a PlayerId> {
    let start = pivot.and_then(|pivot| players.iter().position(|id| id == pivot));

    match start {
        Some(index) => players[index + 1..]
            .iter()
            .chain(&players[..index])
            .find(|id| is_available(id)),
        None => players.iter().find(|id| is_available(id)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<PlayerId> {
        names
            .iter()
            .map(|name| PlayerId::from_bus_name(&format!("org.mpris.MediaPlayer2.{name}")))
            .collect()
    }

    #[test]
    fn scans_forward_from_pivot() {
        let players = ids(&["a", "b", "c"]);

        let next = select_next(&players, Some(&players[1]), |_| true);

        assert_eq!(next, Some(&players[2]));
    }

    #[test]
    fn wraps_around_before_pivot() {
        let players = ids(&["a", "b", "c"]);
        let c = players[2].clone();

        let next = select_next(&players, Some(&players[1]), |id| *id != c);

        assert_eq!(next, Some(&players[0]));
    }

    #[test]
    fn pivot_itself_is_never_selected() {
        let players = ids(&["a", "b"]);
        let b = players[1].clone();

        assert_eq!(select_next(&players, Some(&b), |id| *id == b), None);
    }

    #[test]
    fn without_pivot_scans_whole_list() {
        let players = ids(&["a", "b", "c"]);
        let b = players[1].clone();

        assert_eq!(select_next(&players, None, |id| *id == b), Some(&b));
    }

    #[test]
    fn empty_list_selects_nothing() {
        assert_eq!(select_next(&[], None, |_| true), None);
    }
}
