use std::rc::Rc;

/// Named parts of the dialog markup.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Region {
    Loading,
    Content,
    Map,
    CarrierName,
    PartnerName,
    PartnerImage,
    AddressLine1,
    AddressLine2,
    PhoneRow,
    Phone,
    EmailRow,
    Email,
    HoursCard,
    Hours,
    NoHoursCard,
    MapLink,
}

impl Region {
    pub const ALL: [Self; 16] = [
        Self::Loading,
        Self::Content,
        Self::Map,
        Self::CarrierName,
        Self::PartnerName,
        Self::PartnerImage,
        Self::AddressLine1,
        Self::AddressLine2,
        Self::PhoneRow,
        Self::Phone,
        Self::EmailRow,
        Self::Email,
        Self::HoursCard,
        Self::Hours,
        Self::NoHoursCard,
        Self::MapLink,
    ];
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeKind {
    Loading,
    Error,
    Warning,
    Muted,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Link {
    pub href: String,
    pub label: String,
}

/// A placeholder message that replaces the content of a region.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub kind: NoticeKind,
    pub message: String,
    pub link: Option<Link>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ListenerTarget {
    /// Elements that open the dialog.
    Trigger,
    /// Close buttons inside the dialog.
    Dismiss,
    /// Clicks outside of the dialog content.
    Backdrop,
    Keyboard,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum UiEvent {
    Click {
        /// Data attached to the clicked element.
        carrier_id: Option<String>,
    },
    KeyDown {
        key: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ListenerId(pub u64);

pub type EventHandler = Rc<dyn Fn(&UiEvent)>;

/// The host page.
///
/// Regions that don't exist in the markup must be ignored silently.
/// Handlers must be invoked without holding any internal borrows,
/// because they may add or remove listeners.
pub trait Document {
    fn has_region(&self, region: Region) -> bool;
    fn set_text(&self, region: Region, text: &str);
    fn set_href(&self, region: Region, href: &str);
    fn set_src(&self, region: Region, src: &str);
    fn set_visible(&self, region: Region, visible: bool);
    fn show_notice(&self, region: Region, notice: &Notice);
    fn clear(&self, region: Region);

    fn has_overlay(&self) -> bool;
    fn create_overlay(&self);
    fn remove_overlay(&self);
    /// Takes the dialog in or out of the layout.
    fn set_dialog_displayed(&self, displayed: bool);
    /// Starts the fade in or fade out transition of dialog and overlay.
    fn set_dialog_shown(&self, shown: bool);
    /// Blocks scrolling of the page behind the dialog.
    fn set_modal_open(&self, open: bool);

    fn add_listener(&self, target: ListenerTarget, handler: EventHandler) -> ListenerId;
    fn remove_listener(&self, id: ListenerId);
}
