//! Static emblem catalog
//!
//! Base traits, member benefits and descriptions per emblem type, plus the
//! cumulative tier bonus traits. The shop's catalog page looks entries up by
//! slug (`GET /api/emblems/catalog/{slug}`); slugs it does not know resolve
//! to the generic entry.

use super::kind::{EmblemType, Rarity};

/// Catalog entry for one emblem type
#[derive(Debug)]
pub struct CatalogEntry {
    pub base_traits: [&'static str; 3],
    pub benefits: &'static [&'static str],
    pub description: &'static str,
}

const LUPUL_INTELEPTA: CatalogEntry = CatalogEntry {
    base_traits: ["Înțelepciune Ancestrală", "Instinct Protector", "Spiritul Haitei"],
    benefits: &[
        "Reducere 10% la toate produsele",
        "Acces prioritar la ședințele de terapie",
        "Ghid lunar de înțelepciune",
    ],
    description: "Lupul Înțelept veghează asupra celor care caută echilibrul. \
                  Poartă înțelepciunea strămoșilor și protejează drumul spre vindecare.",
};

const CORBUL_MISTIC: CatalogEntry = CatalogEntry {
    base_traits: ["Viziune Mistică", "Mesager între Lumi", "Memorie Străveche"],
    benefits: &[
        "Reducere 10% la toate produsele",
        "Acces la meditații ghidate exclusive",
        "Invitații la cercurile de comunitate",
    ],
    description: "Corbul Mistic zboară între lumi și aduce mesaje ascunse. \
                  Deschide calea spre intuiție și cunoaștere interioară.",
};

const GARDIANUL_WELLNESS: CatalogEntry = CatalogEntry {
    base_traits: ["Vitalitate", "Armonie Interioară", "Scut de Energie"],
    benefits: &[
        "Reducere 15% la serviciile de wellness",
        "Consultație anuală gratuită",
        "Plan personalizat de bunăstare",
    ],
    description: "Gardianul Wellness păzește trupul și sufletul. \
                  Aduce putere, vitalitate și armonie în fiecare zi.",
};

const CAUTATORUL_LUMINA: CatalogEntry = CatalogEntry {
    base_traits: ["Lumină Interioară", "Curaj", "Drum Deschis"],
    benefits: &[
        "Reducere 10% la atelierele de dezvoltare personală",
        "Acces anticipat la evenimente",
        "Jurnal digital de progres",
    ],
    description: "Căutătorul de Lumină urmează calea spre claritate. \
                  Ghidează pașii celor care își caută propriul adevăr.",
};

const GENERIC: CatalogEntry = CatalogEntry {
    base_traits: ["Spirit Liber", "Echilibru", "Speranță"],
    benefits: &["Acces la comunitatea Lupul și Corbul"],
    description: "Un emblem unic din colecția Lupul și Corbul.",
};

/// Tier bonus traits; each tier takes a prefix of this list
const TIER_BONUS_TRAITS: [&str; 4] = [
    "Aură Luminoasă",
    "Energie Vibrantă",
    "Putere Mistică",
    "Esență Legendară",
];

/// Look up an entry by slug, falling back to the generic entry
pub fn entry(slug: &str) -> &'static CatalogEntry {
    match EmblemType::from_slug(slug) {
        Some(t) => entry_for(t),
        None => &GENERIC,
    }
}

pub fn entry_for(emblem_type: EmblemType) -> &'static CatalogEntry {
    match emblem_type {
        EmblemType::LupulIntelepta => &LUPUL_INTELEPTA,
        EmblemType::CorbulMistic => &CORBUL_MISTIC,
        EmblemType::GardianulWellness => &GARDIANUL_WELLNESS,
        EmblemType::CautatorulLumina => &CAUTATORUL_LUMINA,
    }
}

pub fn tier_bonus_traits(rarity: Rarity) -> &'static [&'static str] {
    &TIER_BONUS_TRAITS[..rarity.bonus_trait_count()]
}

/// Benefits granted to the holder, as owned strings for documents
pub fn benefits(emblem_type: EmblemType) -> Vec<String> {
    entry_for(emblem_type)
        .benefits
        .iter()
        .map(|b| b.to_string())
        .collect()
}

/// Static image path for an emblem type
pub fn image_path(slug: &str) -> String {
    format!("/images/emblems/{}.png", slug)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_type_has_description_and_benefits() {
        for t in EmblemType::ALL {
            let e = entry_for(t);
            assert!(!e.description.is_empty(), "{} has no description", t);
            assert!(!e.benefits.is_empty(), "{} has no benefits", t);
            assert_eq!(e.base_traits.len(), 3);
        }
    }

    #[test]
    fn test_unknown_slug_falls_back() {
        let e = entry("dragonul_vechi");
        assert!(!e.description.is_empty());
        assert!(!e.benefits.is_empty());
        assert!(std::ptr::eq(e, &GENERIC));
    }

    #[test]
    fn test_tier_bonus_prefixes() {
        let order = [Rarity::Common, Rarity::Rare, Rarity::Epic, Rarity::Legendary];
        for pair in order.windows(2) {
            let lower = tier_bonus_traits(pair[0]);
            let higher = tier_bonus_traits(pair[1]);
            assert_eq!(higher.len(), lower.len() + 1);
            assert_eq!(&higher[..lower.len()], lower);
        }
        assert_eq!(tier_bonus_traits(Rarity::Legendary).last(), Some(&"Esență Legendară"));
    }
}
