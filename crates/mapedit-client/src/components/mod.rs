mod map_data_panel;
mod map_surface;
mod modal;
mod notice_toast;
mod objects_panel;
mod polygons_panel;
mod symbol;

pub use map_data_panel::MapDataPanel;
pub use map_surface::MapSurface;
pub use modal::Modal;
pub use notice_toast::NoticeToast;
pub use objects_panel::ObjectsPanel;
pub use polygons_panel::PolygonsPanel;
pub use symbol::{SymbolStyle, symbol_style};
