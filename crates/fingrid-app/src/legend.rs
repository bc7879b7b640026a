// Copyright 2026 Phillip Cloud
// Licensed under the Apache License, Version 2.0

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LegendState {
    AllVisible,
    Isolated(usize),
}

impl LegendState {
    /// Reads the state back from per-series visibility flags.
    pub fn of(visibility: &[bool]) -> Self {
        let mut visible = visibility
            .iter()
            .enumerate()
            .filter(|(_, shown)| **shown)
            .map(|(index, _)| index);
        match (visible.next(), visible.next()) {
            (Some(only), None) if visibility.len() > 1 => Self::Isolated(only),
            _ => Self::AllVisible,
        }
    }
}

/// Legend click on series `clicked`: restore every series when it is the
/// only one shown, otherwise show it alone. Out-of-range clicks change
/// nothing.
pub fn toggle_isolation(visibility: &mut [bool], clicked: usize) -> Option<LegendState> {
    if clicked >= visibility.len() {
        return None;
    }

    let only_visible = visibility
        .iter()
        .enumerate()
        .all(|(index, shown)| *shown == (index == clicked));
    if only_visible {
        visibility.iter_mut().for_each(|shown| *shown = true);
    } else {
        for (index, shown) in visibility.iter_mut().enumerate() {
            *shown = index == clicked;
        }
    }
    Some(LegendState::of(visibility))
}
