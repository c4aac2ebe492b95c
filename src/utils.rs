use gnss::prelude::{Constellation, SV};

/// NMEA numbers SBAS satellites 33..=64 (PRN - 87)
const NMEA_SBAS_OFFSET: u8 = 87;

const SBAS_PRN_OFFSET: u8 = 100;

/// Converts NMEA (GP talker) satellite number to [SV]
pub fn to_sv(id: u8) -> Option<SV> {
    match id {
        1..=32 => Some(SV::new(Constellation::GPS, id)),
        33..=64 => Some(SV::new(
            Constellation::SBAS,
            id + NMEA_SBAS_OFFSET - SBAS_PRN_OFFSET,
        )),
        _ => None,
    }
}

/// Satellite identity, as displayed to the operator
pub fn sv_label(id: u8) -> String {
    match to_sv(id) {
        Some(sv) => sv.to_string(),
        None => format!("#{:02}", id),
    }
}

/// One '*' per `scale` of S4C
pub fn intensity_bar(s4c: f64, scale: f64) -> String {
    if scale <= 0.0 || s4c <= 0.0 {
        return String::new();
    }

    "*".repeat((s4c / scale).floor() as usize)
}

#[cfg(test)]
mod test {
    use super::{intensity_bar, sv_label, to_sv};
    use gnss::prelude::Constellation;

    #[test]
    fn satellites() {
        let sv = to_sv(5).unwrap();
        assert_eq!(sv.constellation, Constellation::GPS);
        assert_eq!(sv.prn, 5);

        let sv = to_sv(33).unwrap();
        assert_eq!(sv.constellation, Constellation::SBAS);
        assert_eq!(sv.prn, 20);

        assert!(to_sv(0).is_none());
        assert!(to_sv(65).is_none());
        assert_eq!(sv_label(0), "#00");
    }

    #[test]
    fn intensity() {
        assert_eq!(intensity_bar(0.0, 0.333), "");
        assert_eq!(intensity_bar(0.30, 0.333), "");
        assert_eq!(intensity_bar(0.34, 0.333), "*");
        assert_eq!(intensity_bar(1.45, 0.333), "****");
        assert_eq!(intensity_bar(1.45, 0.25), "*****");
        assert_eq!(intensity_bar(1.45, 0.0), "");
    }
}
