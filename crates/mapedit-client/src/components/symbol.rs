use mapedit_core::SymbolKind;

/// How a symbol kind is drawn on the map and in the list.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SymbolStyle {
    pub color: &'static str,
    pub glyph: &'static str,
}

pub fn symbol_style(kind: SymbolKind) -> SymbolStyle {
    let (color, glyph) = match kind {
        SymbolKind::Marker => ("#2680c2", "●"),
        SymbolKind::Landmark => ("#8e44ad", "★"),
        SymbolKind::Beach => ("#f0b429", "☀"),
        SymbolKind::Historical => ("#8d6e63", "⌛"),
        SymbolKind::Monument => ("#616e7c", "▲"),
        SymbolKind::Garden => ("#3f9142", "✿"),
        SymbolKind::Museum => ("#c65d21", "⌂"),
        SymbolKind::Nature => ("#27ab83", "♣"),
    };
    SymbolStyle { color, glyph }
}
