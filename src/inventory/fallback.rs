//! Curated fallback station list.
//!
//! When the inventory service is unreachable the selector evaluates this
//! static list of globally distributed, long-running broadband stations
//! (GSN IU/II, GEOSCOPE G, GEOFON GE plus a few Nordic regionals) with the
//! same distance and arrival logic it applies to live inventories.
//! Coordinates are catalog values rounded to two decimals, which is far
//! below the distance-binning resolution.

use super::{ChannelEntry, Inventory, NetworkEntry, StationEntry};

/// (network, station, latitude, longitude, elevation_m)
const CURATED: &[(&str, &str, f64, f64, f64)] = &[
    // GSN / IRIS-USGS (IU)
    ("IU", "ADK", 51.88, -176.68, 130.0),
    ("IU", "AFI", -13.91, -171.78, 706.0),
    ("IU", "ANMO", 34.95, -106.46, 1850.0),
    ("IU", "ANTO", 39.87, 32.79, 1090.0),
    ("IU", "BILL", 68.07, 166.45, 320.0),
    ("IU", "CASY", -66.28, 110.53, 10.0),
    ("IU", "CCM", 38.06, -91.24, 222.0),
    ("IU", "CHTO", 18.81, 98.94, 420.0),
    ("IU", "COLA", 64.87, -147.86, 200.0),
    ("IU", "COR", 44.59, -123.30, 110.0),
    ("IU", "CTAO", -20.09, 146.25, 357.0),
    ("IU", "DAV", 7.07, 125.58, 150.0),
    ("IU", "DWPF", 28.11, -81.43, 30.0),
    ("IU", "FURI", 8.90, 38.69, 2570.0),
    ("IU", "GNI", 40.15, 44.74, 1510.0),
    ("IU", "GRFO", 49.69, 11.22, 384.0),
    ("IU", "GUMO", 13.59, 144.87, 170.0),
    ("IU", "HNR", -9.44, 159.95, 0.0),
    ("IU", "HRV", 42.51, -71.56, 200.0),
    ("IU", "INCN", 37.48, 126.62, 80.0),
    ("IU", "KBS", 78.92, 11.94, 90.0),
    ("IU", "KEV", 69.76, 27.01, 100.0),
    ("IU", "KIP", 21.42, -158.01, 70.0),
    ("IU", "KMBO", -1.13, 37.25, 1930.0),
    ("IU", "KONO", 59.65, 9.60, 216.0),
    ("IU", "LCO", -29.01, -70.70, 2300.0),
    ("IU", "LSZ", -15.28, 28.19, 1200.0),
    ("IU", "LVC", -22.61, -68.91, 2930.0),
    ("IU", "MA2", 59.58, 150.77, 339.0),
    ("IU", "MAJO", 36.55, 138.20, 405.0),
    ("IU", "MAKZ", 46.81, 81.98, 600.0),
    ("IU", "MBWA", -21.16, 119.73, 190.0),
    ("IU", "NWAO", -32.93, 117.24, 380.0),
    ("IU", "OTAV", 0.24, -78.45, 3510.0),
    ("IU", "PAB", 39.55, -4.35, 950.0),
    ("IU", "PET", 53.02, 158.65, 110.0),
    ("IU", "PMG", -9.41, 147.15, 90.0),
    ("IU", "PMSA", -64.77, -64.05, 40.0),
    ("IU", "POHA", 19.76, -155.53, 1910.0),
    ("IU", "PTGA", -0.73, -59.97, 240.0),
    ("IU", "QSPA", -89.93, 144.44, 2850.0),
    ("IU", "RAR", -21.21, -159.77, 28.0),
    ("IU", "RCBR", -5.82, -35.90, 290.0),
    ("IU", "RSSD", 44.12, -104.04, 2090.0),
    ("IU", "SBA", -77.85, 166.76, 50.0),
    ("IU", "SDV", 8.88, -70.63, 1580.0),
    ("IU", "SFJD", 67.00, -50.62, 330.0),
    ("IU", "SJG", 18.11, -66.15, 420.0),
    ("IU", "SNZO", -41.31, 174.70, 120.0),
    ("IU", "SSPA", 40.64, -77.89, 270.0),
    ("IU", "TATO", 24.97, 121.49, 160.0),
    ("IU", "TEIG", 20.23, -88.28, 40.0),
    ("IU", "TIXI", 71.65, 128.87, 40.0),
    ("IU", "TSUM", -19.20, 17.58, 1260.0),
    ("IU", "TUC", 32.31, -110.78, 910.0),
    ("IU", "ULN", 47.87, 107.05, 1610.0),
    ("IU", "WCI", 38.23, -86.29, 210.0),
    ("IU", "YAK", 62.03, 129.68, 110.0),
    ("IU", "YSS", 46.96, 142.76, 150.0),
    // GSN / IDA (II)
    ("II", "AAK", 42.64, 74.49, 1680.0),
    ("II", "ALE", 82.50, -62.35, 60.0),
    ("II", "ARU", 56.43, 58.56, 250.0),
    ("II", "ASCN", -7.93, -14.36, 173.0),
    ("II", "BFO", 48.33, 8.33, 589.0),
    ("II", "BORG", 64.75, -21.33, 110.0),
    ("II", "BRVK", 53.06, 70.28, 330.0),
    ("II", "CMLA", 37.76, -25.52, 429.0),
    ("II", "COCO", -12.19, 96.83, 1.0),
    ("II", "DGAR", -7.41, 72.45, 1.0),
    ("II", "ERM", 42.02, 143.16, 40.0),
    ("II", "ESK", 55.32, -3.21, 242.0),
    ("II", "FFC", 54.73, -101.98, 338.0),
    ("II", "HOPE", -54.28, -36.49, 20.0),
    ("II", "KAPI", -5.01, 119.75, 300.0),
    ("II", "KDAK", 57.78, -152.58, 150.0),
    ("II", "KIV", 43.96, 42.69, 1210.0),
    ("II", "KURK", 50.72, 78.62, 184.0),
    ("II", "KWAJ", 8.80, 167.61, 0.0),
    ("II", "LVZ", 67.90, 34.65, 630.0),
    ("II", "MBAR", -0.60, 30.74, 1390.0),
    ("II", "MSEY", -4.67, 55.48, 475.0),
    ("II", "NNA", -11.99, -76.84, 575.0),
    ("II", "OBN", 55.11, 36.57, 160.0),
    ("II", "PALK", 7.27, 80.70, 460.0),
    ("II", "PFO", 33.61, -116.46, 1280.0),
    ("II", "RPN", -27.13, -109.33, 110.0),
    ("II", "SACV", 14.97, -23.61, 387.0),
    ("II", "SUR", -32.38, 20.81, 1770.0),
    ("II", "TAU", -42.91, 147.32, 132.0),
    ("II", "TLY", 51.68, 103.64, 579.0),
    ("II", "WRAB", -19.93, 134.36, 366.0),
    // GEOSCOPE (G)
    ("G", "CAN", -35.32, 148.99, 650.0),
    ("G", "CLF", 48.02, 2.26, 145.0),
    ("G", "CRZF", -46.43, 51.86, 140.0),
    ("G", "ECH", 48.22, 7.16, 580.0),
    ("G", "INU", 35.35, 137.03, 132.0),
    ("G", "KOG", 5.21, -52.73, 10.0),
    ("G", "NOUC", -22.10, 166.30, 98.0),
    ("G", "PAF", -49.35, 70.21, 17.0),
    ("G", "PPTF", -17.57, -149.58, 705.0),
    ("G", "SSB", 45.28, 4.54, 700.0),
    ("G", "TAM", 22.79, 5.53, 1395.0),
    ("G", "UNM", 19.33, -99.18, 2280.0),
    // GEOFON (GE)
    ("GE", "APE", 37.07, 25.53, 620.0),
    ("GE", "BOAB", 12.45, -85.66, 381.0),
    ("GE", "DSB", 53.25, -6.38, 100.0),
    ("GE", "KARP", 35.55, 27.16, 524.0),
    ("GE", "MORC", 49.78, 17.54, 740.0),
    ("GE", "PSZ", 47.92, 19.89, 940.0),
    ("GE", "RGN", 54.55, 13.32, 15.0),
    ("GE", "SNAA", -71.67, -2.84, 846.0),
    ("GE", "STU", 48.77, 9.19, 360.0),
    ("GE", "SUMG", 72.58, -38.45, 3240.0),
    ("GE", "WLF", 49.66, 6.15, 295.0),
    // Nordic regionals
    ("DK", "BSD", 55.11, 14.91, 88.0),
    ("DK", "COP", 55.68, 12.43, 13.0),
    ("DK", "MUD", 56.46, 9.17, 39.0),
    ("NS", "BSEG", 62.20, 5.22, 60.0),
    ("UP", "UDD", 64.51, 21.04, 230.0),
];

/// Build the curated list as an inventory tree, so the selector can run the
/// exact same evaluation path it uses for live results.
pub fn curated_inventory() -> Inventory {
    let mut networks: Vec<NetworkEntry> = Vec::new();
    for &(net, sta, lat, lon, elev) in CURATED {
        let channels = ["BHZ", "BHN", "BHE"]
            .iter()
            .map(|code| ChannelEntry {
                code: (*code).to_string(),
                location: "00".to_string(),
                sample_rate_hz: 20.0,
            })
            .collect();
        let station = StationEntry {
            code: sta.to_string(),
            latitude: lat,
            longitude: lon,
            elevation_m: elev,
            start_date: None,
            end_date: None,
            channels,
        };
        match networks.iter_mut().find(|n| n.code == net) {
            Some(network) => network.stations.push(station),
            None => networks.push(NetworkEntry { code: net.to_string(), stations: vec![station] }),
        }
    }
    Inventory { networks }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::inventory::network_priority;

    #[test]
    fn test_at_least_80_stations() {
        assert!(curated_inventory().station_count() >= 80);
    }

    #[test]
    fn test_no_duplicate_ids() {
        let inventory = curated_inventory();
        let mut seen = std::collections::HashSet::new();
        for (net, station) in inventory.stations() {
            assert!(seen.insert(format!("{}.{}", net, station.code)), "duplicate {}.{}", net, station.code);
        }
    }

    #[test]
    fn test_mostly_premium_networks() {
        let inventory = curated_inventory();
        let premium = inventory
            .stations()
            .filter(|(net, _)| network_priority(net) <= 2)
            .count();
        assert!(premium * 10 >= inventory.station_count() * 9);
    }

    #[test]
    fn test_global_coverage() {
        let inventory = curated_inventory();
        let southern = inventory.stations().filter(|(_, s)| s.latitude < 0.0).count();
        let northern = inventory.stations().filter(|(_, s)| s.latitude > 0.0).count();
        assert!(southern >= 20, "only {} southern-hemisphere stations", southern);
        assert!(northern >= 40);
    }

    #[test]
    fn test_coordinates_in_range() {
        for (_, station) in curated_inventory().stations() {
            assert!((-90.0..=90.0).contains(&station.latitude));
            assert!((-180.0..=180.0).contains(&station.longitude));
        }
    }
}
