//! Standard property kind names and keyword inference.

/// Property kind names recognised without local definition.
pub(crate) const STANDARD_KINDS: &[&str] = &[
    "absorbed dose",
    "acceleration linear",
    "activity (of radioactivity)",
    "amount of substance",
    "amplitude",
    "angle per length",
    "angle per time",
    "angle per volume",
    "angular acceleration",
    "area",
    "area per area",
    "area per volume",
    "attenuation",
    "attenuation per length",
    "azimuth",
    "bubble point pressure",
    "bulk modulus",
    "capacitance",
    "categorical",
    "cell length",
    "charge density",
    "chemical potential",
    "code",
    "compressibility",
    "concentration of B",
    "conductivity",
    "continuous",
    "cross section absorption",
    "current density",
    "Darcy flow coefficient",
    "data transmission speed",
    "delta temperature",
    "density",
    "depth",
    "diffusion coefficient",
    "digital storage",
    "dimensionless",
    "discrete",
    "dose equivalent",
    "dose equivalent rate",
    "dynamic viscosity",
    "electric charge",
    "electric conductance",
    "electric current",
    "electric dipole moment",
    "electric field strength",
    "electric polarization",
    "electric potential",
    "electrical resistivity",
    "electrochemical equivalent",
    "electromagnetic moment",
    "energy length per area",
    "energy length per time area temperature",
    "energy per area",
    "energy per length",
    "equivalent per mass",
    "equivalent per volume",
    "exposure (radioactivity)",
    "fluid volume",
    "force",
    "force area",
    "force length per length",
    "force per force",
    "force per length",
    "force per volume",
    "formation volume factor",
    "frequency",
    "frequency interval",
    "gamma ray API unit",
    "heat capacity",
    "heat flow rate",
    "heat transfer coefficient",
    "illuminance",
    "index",
    "irradiance",
    "isothermal compressibility",
    "kinematic viscosity",
    "Lambda Rho",
    "Lame constant",
    "length",
    "length per length",
    "length per temperature",
    "length per volume",
    "level of power intensity",
    "light exposure",
    "linear thermal expansion",
    "luminance",
    "luminous efficacy",
    "luminous flux",
    "luminous intensity",
    "magnetic dipole moment",
    "magnetic field strength",
    "magnetic flux",
    "magnetic induction",
    "magnetic permeability",
    "magnetic vector potential",
    "mass",
    "mass attenuation coefficient",
    "mass concentration",
    "mass flow rate",
    "mass length",
    "mass per energy",
    "mass per length",
    "mass per time per area",
    "mass per time per length",
    "mass per volume per length",
    "mobility",
    "modulus of compression",
    "molar volume",
    "molecular weight",
    "moment of force",
    "moment of inertia",
    "moment of section",
    "momentum",
    "Mu Rho",
    "net to gross ratio",
    "neutron API unit",
    "nonDarcy flow coefficient",
    "operations per time",
    "parachor",
    "per area",
    "per electric potential",
    "per force",
    "per length",
    "per mass",
    "per volume",
    "permeability length",
    "permeability rock",
    "permeability thickness",
    "permeance",
    "permittivity",
    "pH",
    "plane angle",
    "Poisson ratio",
    "pore volume",
    "porosity",
    "potential difference per power drop",
    "power",
    "power per volume",
    "pressure",
    "pressure per time",
    "pressure squared",
    "pressure squared per force time per area",
    "pressure time per volume",
    "productivity index",
    "property multiplier",
    "quantity",
    "quantity of light",
    "radiance",
    "radiant intensity",
    "relative permeability",
    "relative power",
    "relative time",
    "reluctance",
    "resistance",
    "resistivity per length",
    "RESQML root property",
    "Rock Impedance",
    "rock permeability",
    "rock volume",
    "saturation",
    "second moment of area",
    "shear modulus",
    "solid angle",
    "solution gas-oil ratio",
    "specific activity (of radioactivity)",
    "specific energy",
    "specific heat capacity",
    "specific productivity index",
    "specific volume",
    "surface density",
    "temperature per length",
    "temperature per time",
    "thermal conductance",
    "thermal conductivity",
    "thermal diffusivity",
    "thermal insulance",
    "thermal resistance",
    "thermodynamic temperature",
    "thickness",
    "time",
    "time per length",
    "time per volume",
    "transmissibility",
    "unit productivity index",
    "unitless",
    "vapor oil-gas ratio",
    "velocity",
    "volume",
    "volume flow rate",
    "volume length per time",
    "volume per area",
    "volume per length",
    "volume per time per area",
    "volume per time per length",
    "volume per time per pressure",
    "volume per time per time",
    "volume per time per volume",
    "volume per volume",
    "volumetric heat transfer coefficient",
    "volumetric thermal expansion",
    "work",
    "Young modulus",
];

/// Guess (kind, facet type, facet) from a simulator keyword or log
/// mnemonic, falling back to the unit of measure.
///
/// Returns `("Unknown", None, None)` when nothing matches.
pub fn infer_property_kind(keyword: &str, uom: &str) -> (String, Option<String>, Option<String>) {
    let trimmed = keyword.trim();
    if let Some(kind) = STANDARD_KINDS.iter().find(|k| **k == trimmed) {
        return (kind.to_string(), None, None);
    }

    let upper = trimmed.to_ascii_uppercase();
    let plain = |kind: &str| (kind.to_string(), None, None);
    let facet = |kind: &str, facet_type: &str, facet: &str| {
        (kind.to_string(), Some(facet_type.to_string()), Some(facet.to_string()))
    };
    let direction = |suffix: Option<char>| match suffix {
        Some('X') | Some('I') => Some("I"),
        Some('Y') | Some('J') => Some("J"),
        Some('Z') | Some('K') => Some("K"),
        _ => None,
    };
    let last = upper.chars().last();

    match upper.as_str() {
        "NTG" | "NETGRS" | "NET TO GROSS" => return plain("net to gross ratio"),
        "PORO" | "PHI" | "POROSITY" => return plain("porosity"),
        "PERMX" | "PERMY" | "PERMZ" | "PERMI" | "PERMJ" | "PERMK" | "KX" | "KY" | "KZ" | "KI" | "KJ" | "KK" => {
            if let Some(d) = direction(last) {
                return facet("rock permeability", "direction", d);
            }
        }
        "PERM" => return plain("rock permeability"),
        "SW" | "SWAT" => return facet("saturation", "what", "water"),
        "SO" | "SOIL" => return facet("saturation", "what", "oil"),
        "SG" | "SGAS" => return facet("saturation", "what", "gas"),
        "P" | "PRES" | "PRESSURE" => return plain("pressure"),
        "TX" | "TY" | "TZ" | "TRANX" | "TRANY" | "TRANZ" | "TI" | "TJ" | "TK" => {
            if let Some(d) = direction(last) {
                return facet("transmissibility", "direction", d);
            }
        }
        "DX" | "DY" | "DZ" | "DI" | "DJ" | "DK" => {
            if let Some(d) = direction(last) {
                return facet("cell length", "direction", d);
            }
        }
        "DEPTH" | "TOPS" | "DEPT" => return plain("depth"),
        "THICKNESS" | "H" => return plain("thickness"),
        "TEMP" | "TEMPERATURE" => return plain("thermodynamic temperature"),
        "PORV" | "PV" => return plain("pore volume"),
        "BV" | "BULKVOL" => return plain("rock volume"),
        "ACTNUM" | "ACTIVE" => return plain("active"),
        "FACIES" | "ZONE" | "LITHOLOGY" => return plain("discrete"),
        "FIPNUM" | "SATNUM" | "PVTNUM" | "EQLNUM" | "REGION" => return plain("region initialization"),
        "MULTX" | "MULTY" | "MULTZ" | "MULTPV" => return plain("property multiplier"),
        "GR" => return plain("gamma ray API unit"),
        _ => {}
    }

    match uom.trim() {
        "m" | "ft" => plain("length"),
        "bar" | "psi" | "kPa" | "Pa" => plain("pressure"),
        "mD" | "D" => plain("rock permeability"),
        "m3" | "ft3" | "bbl" => plain("volume"),
        "degC" | "degF" | "K" => plain("thermodynamic temperature"),
        "gAPI" => plain("gamma ray API unit"),
        _ => plain("Unknown"),
    }
}
