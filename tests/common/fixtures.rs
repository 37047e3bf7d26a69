//! Static payload fixtures used across harnesses.
//!
//! One fixture per provider shape, plus the reference scenario every
//! implementation of the normalizer must reproduce.

use serde_json::{json, Value};

/// The reference scenario: two Rifters attacking, one Merlin defending.
pub fn reference_payload() -> Value {
    json!({
        "metadata": { "title": "Test Battle", "system": "Jita", "time": "2025-05-11T12:00:00Z" },
        "attackers": [
            { "ship_type": "Rifter", "value": 1000 },
            { "ship_type": "Rifter", "value": 2000 }
        ],
        "defenders": [
            { "ship_type": "Merlin", "value": 1500 }
        ],
        "events": ["Explosion at 12:01"]
    })
}

/// Killmail as the SSO fetch path returns it: camelCase ship types and
/// `loss_value` instead of `value`.
pub fn esi_killmail_payload() -> Value {
    json!({
        "metadata": { "system": "Tama", "time": "2025-05-10T21:14:03Z" },
        "attackers": [
            { "shipType": "Cormorant", "loss_value": 0, "pilotName": "Attacker One" },
            { "shipType": "Cormorant", "loss_value": 0, "pilotName": "Attacker Two" },
            { "shipType": "Vexor Navy Issue", "loss_value": 0 }
        ],
        "defenders": [
            { "shipType": "Drake", "loss_value": 68_500_000.0, "pilotName": "Victim" }
        ]
    })
}

/// Battle report as the public zKillboard path returns it, with the
/// `_list` aliases.
pub fn zkb_battle_payload() -> Value {
    json!({
        "metadata": { "title": "Amamake brawl", "system": "Amamake" },
        "attackers_list": [
            { "ship_type": "Loki", "value": 950_000_000.0 },
            { "ship_type": "Sabre", "value": 75_000_000.0 },
            { "ship_type": "Loki", "value": 910_000_000.0 }
        ],
        "defenders_list": [
            { "ship_type": "Legion", "value": 820_000_000.0 },
            { "ship_type": "Guardian", "value": 310_000_000.0 }
        ],
        "events": ["Sabre bubble on gate", "Guardian lost at 21:40"]
    })
}

/// Manual participant table as a JSON array, as the CLI reads it from disk.
pub fn manual_participants_json() -> Value {
    json!([
        { "ship_type": "Rifter", "value": 1000, "pilot_name": "Red One" },
        { "ship_type": "Rifter", "value": 2000, "pilot_name": "Red Two" }
    ])
}
