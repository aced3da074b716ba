//! Splices composite components into the node graph.
//!
//! The model connects the parts of a composite by reference; the record graph
//! needs named nodes between them. Internal node names are derived from the
//! parent name with [`node_name`], so the same model always yields the same
//! names.

use super::Diagnostics;
use crate::error::TranslationError;
use crate::idf::schema as idf;
use crate::idf::{IdfRecord, RecordId, Workspace};
use crate::model::hvac::fields as hf;
use crate::model::{Model, ObjectStore};
use crate::Handle;

pub const OA_NODE: &str = "OA Node";
pub const SUPPLY_FAN_INLET_NODE: &str = "Supply Fan Inlet Node";
pub const EXHAUST_FAN_INLET_NODE: &str = "Exhaust Fan Inlet Node";
pub const EXHAUST_FAN_OUTLET_NODE: &str = "Exhaust Fan Outlet Node";

const AIR_INLET: &str = "Air Inlet Node Name";
const AIR_OUTLET: &str = "Air Outlet Node Name";

/// Name of an internal node of the composite `base`.
pub fn node_name(base: &str, role: &str) -> String {
    format!("{base} {role}")
}

/// Records emitted for the component references of a parent, keyed by the
/// model field that referenced them.
#[derive(Debug, Clone, Default)]
pub struct Children(Vec<(&'static str, RecordId)>);

impl Children {
    pub fn push(&mut self, field: &'static str, id: RecordId) {
        self.0.push((field, id));
    }

    pub fn get(&self, field: &str) -> Option<RecordId> {
        self.0.iter().find(|(f, _)| *f == field).map(|(_, id)| *id)
    }
}

/// Everything a stitch may read or write besides the parent record.
pub struct StitchContext<'a> {
    pub model: &'a Model,
    pub source: &'a Handle,
    pub children: &'a Children,
    pub workspace: &'a mut Workspace,
    pub log: &'a mut Diagnostics,
}

/// Internal nodes of an energy recovery ventilator.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ErvNodes {
    pub oa: String,
    pub supply_fan_inlet: String,
    pub exhaust_fan_inlet: String,
    pub exhaust_fan_outlet: String,
}

impl ErvNodes {
    pub fn new(base: &str) -> Self {
        Self {
            oa: node_name(base, OA_NODE),
            supply_fan_inlet: node_name(base, SUPPLY_FAN_INLET_NODE),
            exhaust_fan_inlet: node_name(base, EXHAUST_FAN_INLET_NODE),
            exhaust_fan_outlet: node_name(base, EXHAUST_FAN_OUTLET_NODE),
        }
    }
}

fn required_child(
    ctx: &StitchContext,
    record: &IdfRecord,
    field: &str,
) -> Result<RecordId, TranslationError> {
    ctx.children
        .get(field)
        .ok_or_else(|| TranslationError::MissingRequired {
            object: record.brief_description(),
            field: field.to_string(),
        })
}

/// Name of the zone node the ERV model field points at.
fn zone_node<'m>(
    ctx: &StitchContext<'m>,
    record: &IdfRecord,
    field: &str,
) -> Result<&'m str, TranslationError> {
    ctx.model
        .get_target(ctx.source, field)
        .and_then(|node| ctx.model.object(&node))
        .and_then(|node| node.name.as_deref())
        .ok_or_else(|| TranslationError::Invalid {
            object: record.brief_description(),
            message: format!("{field} is not connected to a zone"),
        })
}

/// Wires heat exchanger and fans of an ERV between the zone nodes:
///
/// ```text
/// OA Node -> [HX supply] -> Supply Fan Inlet Node -> [supply fan] -> zone inlet
/// zone exhaust -> [HX exhaust] -> Exhaust Fan Inlet Node -> [exhaust fan] -> Exhaust Fan Outlet Node
/// ```
pub fn stitch_energy_recovery_ventilator(
    ctx: StitchContext,
    record: &mut IdfRecord,
    base: &str,
) -> Result<(), TranslationError> {
    let zone_inlet = zone_node(&ctx, record, hf::OUTLET_NODE)?;
    let zone_exhaust = zone_node(&ctx, record, hf::INLET_NODE)?;
    let hx = required_child(&ctx, record, hf::HEAT_EXCHANGER)?;
    let supply_fan = required_child(&ctx, record, hf::SUPPLY_AIR_FAN)?;
    let exhaust_fan = required_child(&ctx, record, hf::EXHAUST_AIR_FAN)?;
    let nodes = ErvNodes::new(base);

    let ws = ctx.workspace;
    ws.set_field(hx, "Supply Air Inlet Node Name", nodes.oa.as_str())?;
    ws.set_field(hx, "Supply Air Outlet Node Name", nodes.supply_fan_inlet.as_str())?;
    ws.set_field(hx, "Exhaust Air Inlet Node Name", zone_exhaust)?;
    ws.set_field(hx, "Exhaust Air Outlet Node Name", nodes.exhaust_fan_inlet.as_str())?;

    let controlled = ws
        .get_text(hx, "Supply Air Outlet Temperature Control")
        .is_some_and(|s| s.eq_ignore_ascii_case("Yes"));
    if controlled {
        ws.set_field(hx, "Supply Air Outlet Temperature Control", "No")?;
        let hx_name = ws.record(hx).map(IdfRecord::brief_description);
        ctx.log.warn(
            hx_name.as_deref(),
            format!(
                "Supply Air Outlet Temperature Control is not supported inside {}, set to No",
                record.brief_description()
            ),
        );
    }

    ws.set_field(supply_fan, AIR_INLET, nodes.supply_fan_inlet.as_str())?;
    ws.set_field(supply_fan, AIR_OUTLET, zone_inlet)?;
    ws.set_field(exhaust_fan, AIR_INLET, nodes.exhaust_fan_inlet.as_str())?;
    ws.set_field(exhaust_fan, AIR_OUTLET, nodes.exhaust_fan_outlet.as_str())?;

    for name in [
        nodes.oa.as_str(),
        nodes.supply_fan_inlet.as_str(),
        nodes.exhaust_fan_inlet.as_str(),
        nodes.exhaust_fan_outlet.as_str(),
        zone_inlet,
        zone_exhaust,
    ] {
        ws.add_node(name);
    }

    let mut oa_list = IdfRecord::new(idf::OUTDOOR_AIR_NODE_LIST, None)?;
    oa_list.push_extensible(nodes.oa.as_str())?;
    ws.insert(oa_list);
    Ok(())
}

/// Which parts a unitary system contains and where its fan sits.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct UnitaryLayout {
    pub fan: bool,
    pub blow_through: bool,
    pub cooling_coil: bool,
    pub heating_coil: bool,
    pub supplemental_coil: bool,
}

/// Inlet and outlet node names of one part.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Port {
    pub inlet: String,
    pub outlet: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct UnitaryChain {
    pub fan: Option<Port>,
    pub cooling_coil: Option<Port>,
    pub heating_coil: Option<Port>,
    pub supplemental_coil: Option<Port>,
}

/// Node names along a unitary system running from `inlet` to `outlet`:
///
/// ```text
/// BlowThrough: inlet - Fan - CC - HC - SupplHC - outlet
/// DrawThrough: inlet - CC - HC - Fan - SupplHC - outlet
/// ```
///
/// Every part is optional.
pub fn unitary_chain(base: &str, inlet: &str, outlet: &str, layout: &UnitaryLayout) -> UnitaryChain {
    let n = |role: &str| node_name(base, role);
    let UnitaryLayout {
        fan,
        blow_through,
        cooling_coil: cc,
        heating_coil: hc,
        supplemental_coil: supp,
    } = *layout;
    let blow = fan && blow_through;
    let draw = fan && !blow_through;

    let fan_port = fan.then(|| {
        if blow_through {
            let outlet = if cc {
                n("Fan - Cooling Coil Node")
            } else if hc {
                n("Fan - Heating Coil Node")
            } else if supp {
                n("Fan - Supplemental Coil Node")
            } else {
                outlet.to_string()
            };
            Port {
                inlet: inlet.to_string(),
                outlet,
            }
        } else {
            let inlet = if hc {
                n("Heating Coil - Fan Node")
            } else if cc {
                n("Cooling Coil - Fan Node")
            } else {
                inlet.to_string()
            };
            let outlet = if supp {
                n("Fan - Supplemental Coil Node")
            } else {
                outlet.to_string()
            };
            Port { inlet, outlet }
        }
    });

    let cooling_port = cc.then(|| Port {
        inlet: if blow {
            n("Fan - Cooling Coil Node")
        } else {
            inlet.to_string()
        },
        outlet: if hc {
            n("Cooling Coil - Heating Coil Node")
        } else if draw {
            n("Cooling Coil - Fan Node")
        } else if supp {
            n("Cooling Coil - Supplemental Coil Node")
        } else {
            outlet.to_string()
        },
    });

    let heating_port = hc.then(|| Port {
        inlet: if cc {
            n("Cooling Coil - Heating Coil Node")
        } else if blow {
            n("Fan - Heating Coil Node")
        } else {
            inlet.to_string()
        },
        outlet: if draw {
            n("Heating Coil - Fan Node")
        } else if supp {
            n("Heating Coil - Supplemental Coil Node")
        } else {
            outlet.to_string()
        },
    });

    let supplemental_port = supp.then(|| Port {
        inlet: if draw {
            n("Fan - Supplemental Coil Node")
        } else if hc {
            n("Heating Coil - Supplemental Coil Node")
        } else if cc {
            n("Cooling Coil - Supplemental Coil Node")
        } else if fan {
            n("Fan - Supplemental Coil Node")
        } else {
            inlet.to_string()
        },
        outlet: outlet.to_string(),
    });

    UnitaryChain {
        fan: fan_port,
        cooling_coil: cooling_port,
        heating_coil: heating_port,
        supplemental_coil: supplemental_port,
    }
}

/// Wires fan and coils of a unitary system along its air loop branch.
pub fn stitch_unitary_system(
    ctx: StitchContext,
    record: &mut IdfRecord,
    base: &str,
) -> Result<(), TranslationError> {
    let fan = ctx.children.get(hf::SUPPLY_FAN);
    if fan.is_some() && record.get_text("Fan Placement").is_none() {
        record.set("Fan Placement", "DrawThrough")?;
    }

    let (Some(inlet), Some(outlet)) = (record.get_text(AIR_INLET), record.get_text(AIR_OUTLET))
    else {
        return Err(TranslationError::Invalid {
            object: record.brief_description(),
            message: "Object not attached to AirLoopHVAC".to_string(),
        });
    };

    let cooling = ctx.children.get(hf::COOLING_COIL);
    let heating = ctx.children.get(hf::HEATING_COIL);
    let supplemental = ctx.children.get(hf::SUPPLEMENTAL_HEATING_COIL);
    let layout = UnitaryLayout {
        fan: fan.is_some(),
        blow_through: record
            .get_text("Fan Placement")
            .is_some_and(|s| s.eq_ignore_ascii_case("BlowThrough")),
        cooling_coil: cooling.is_some(),
        heating_coil: heating.is_some(),
        supplemental_coil: supplemental.is_some(),
    };
    let chain = unitary_chain(base, inlet, outlet, &layout);

    let parts = [
        (fan, chain.fan),
        (cooling, chain.cooling_coil),
        (heating, chain.heating_coil),
        (supplemental, chain.supplemental_coil),
    ];
    for (id, port) in parts {
        let (Some(id), Some(port)) = (id, port) else {
            continue;
        };
        ctx.workspace.set_field(id, AIR_INLET, port.inlet.as_str())?;
        ctx.workspace.set_field(id, AIR_OUTLET, port.outlet.as_str())?;
        ctx.workspace.add_node(&port.inlet);
        ctx.workspace.add_node(&port.outlet);
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn port(inlet: &str, outlet: &str) -> Option<Port> {
        Some(Port {
            inlet: inlet.to_string(),
            outlet: outlet.to_string(),
        })
    }

    #[test]
    fn test_node_names_are_deterministic() {
        assert_eq!(ErvNodes::new("ERV1"), ErvNodes::new("ERV1"));
        assert_eq!(
            ErvNodes::new("ERV1").supply_fan_inlet,
            "ERV1 Supply Fan Inlet Node"
        );
    }

    #[test]
    fn test_blow_through_full_chain() {
        let layout = UnitaryLayout {
            fan: true,
            blow_through: true,
            cooling_coil: true,
            heating_coil: true,
            supplemental_coil: true,
        };
        let chain = unitary_chain("U", "In", "Out", &layout);
        assert_eq!(chain.fan, port("In", "U Fan - Cooling Coil Node"));
        assert_eq!(
            chain.cooling_coil,
            port("U Fan - Cooling Coil Node", "U Cooling Coil - Heating Coil Node")
        );
        assert_eq!(
            chain.heating_coil,
            port(
                "U Cooling Coil - Heating Coil Node",
                "U Heating Coil - Supplemental Coil Node"
            )
        );
        assert_eq!(
            chain.supplemental_coil,
            port("U Heating Coil - Supplemental Coil Node", "Out")
        );
    }

    #[test]
    fn test_draw_through_full_chain() {
        let layout = UnitaryLayout {
            fan: true,
            blow_through: false,
            cooling_coil: true,
            heating_coil: true,
            supplemental_coil: true,
        };
        let chain = unitary_chain("U", "In", "Out", &layout);
        assert_eq!(
            chain.cooling_coil,
            port("In", "U Cooling Coil - Heating Coil Node")
        );
        assert_eq!(
            chain.heating_coil,
            port("U Cooling Coil - Heating Coil Node", "U Heating Coil - Fan Node")
        );
        assert_eq!(
            chain.fan,
            port("U Heating Coil - Fan Node", "U Fan - Supplemental Coil Node")
        );
        assert_eq!(
            chain.supplemental_coil,
            port("U Fan - Supplemental Coil Node", "Out")
        );
    }

    #[test]
    fn test_draw_through_cooling_only() {
        let layout = UnitaryLayout {
            fan: true,
            cooling_coil: true,
            ..Default::default()
        };
        let chain = unitary_chain("U", "In", "Out", &layout);
        assert_eq!(chain.cooling_coil, port("In", "U Cooling Coil - Fan Node"));
        assert_eq!(chain.fan, port("U Cooling Coil - Fan Node", "Out"));
        assert!(chain.heating_coil.is_none());
    }

    #[test]
    fn test_single_part_spans_the_branch() {
        let layout = UnitaryLayout {
            heating_coil: true,
            ..Default::default()
        };
        let chain = unitary_chain("U", "In", "Out", &layout);
        assert_eq!(chain.heating_coil, port("In", "Out"));
    }

    #[test]
    fn test_children_lookup() {
        let mut ws = Workspace::new();
        let id = ws.add_node("N");
        let mut children = Children::default();
        children.push(hf::SUPPLY_FAN, id);
        assert_eq!(children.get(hf::SUPPLY_FAN), Some(id));
        assert_eq!(children.get(hf::COOLING_COIL), None);
    }
}
