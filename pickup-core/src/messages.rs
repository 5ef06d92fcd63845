use crate::gateways::{Link, Notice, NoticeKind};

/// User-visible texts.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Messages {
    pub loading: String,
    pub load_failed: String,
    pub not_configured: String,
    pub map_unavailable: String,
    pub location_unknown: String,
    /// Label of the external map search link.
    pub map_search: String,
}

impl Default for Messages {
    fn default() -> Self {
        Self {
            loading: "Cargando información...".into(),
            load_failed: "Error al cargar la información.".into(),
            not_configured: "Este método de entrega no tiene punto de retiro configurado.".into(),
            map_unavailable: "No se pudo cargar el mapa.".into(),
            location_unknown: "No se pudo determinar la ubicación en el mapa.".into(),
            map_search: "Buscar en Google Maps".into(),
        }
    }
}

fn notice(kind: NoticeKind, message: &str) -> Notice {
    Notice {
        kind,
        message: message.to_owned(),
        link: None,
    }
}

impl Messages {
    #[must_use]
    pub fn loading_notice(&self) -> Notice {
        notice(NoticeKind::Loading, &self.loading)
    }

    #[must_use]
    pub fn load_failed_notice(&self) -> Notice {
        notice(NoticeKind::Error, &self.load_failed)
    }

    #[must_use]
    pub fn not_configured_notice(&self) -> Notice {
        notice(NoticeKind::Warning, &self.not_configured)
    }

    #[must_use]
    pub fn map_unavailable_notice(&self) -> Notice {
        notice(NoticeKind::Muted, &self.map_unavailable)
    }

    #[must_use]
    pub fn location_unknown_notice(&self, search_href: String) -> Notice {
        Notice {
            link: Some(Link {
                href: search_href,
                label: self.map_search.clone(),
            }),
            ..notice(NoticeKind::Muted, &self.location_unknown)
        }
    }
}
