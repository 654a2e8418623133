//! Static practitioner tables: one profile per phase bucket and per sign.
//!
//! These are immutable configuration data compiled into the binary. The
//! session intelligence engine looks them up by key and never mutates them.

use crate::phase::PhaseName;
use crate::zodiac::{Element, Quality, ZodiacSign};
use serde::{Deserialize, Serialize};
use std::borrow::Cow;

/// The Moon's synodic tone (Cousto), shared by every phase profile.
pub const MOON_TONE_HZ: f64 = 210.42;

/// Rank of a frequency inside a prescription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FrequencyKind {
    Primary,
    Secondary,
    Planetary,
}

/// One prescribed frequency.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Frequency {
    pub hz: f64,
    pub label: Cow<'static, str>,
    pub kind: FrequencyKind,
}

impl Frequency {
    const fn fixed(hz: f64, label: &'static str, kind: FrequencyKind) -> Self {
        Self {
            hz,
            label: Cow::Borrowed(label),
            kind,
        }
    }
}

#[derive(Debug, PartialEq, Serialize)]
pub struct PhaseProfile {
    pub phase: PhaseName,
    pub subtitle: &'static str,
    pub quote: &'static str,
    pub energy: &'static str,
    pub ideal_for: &'static [&'static str],
    pub avoid: &'static [&'static str],
    /// Ranked: primary, secondary, then the planetary tone
    pub frequencies: &'static [Frequency],
    pub instruments: &'static [&'static str],
    /// Display colour, `#RRGGBB`
    pub colour: &'static str,
}

#[derive(Debug, PartialEq, Serialize)]
pub struct ZodiacProfile {
    pub sign: ZodiacSign,
    pub energy: &'static str,
    pub session_mood: &'static str,
    pub ideal_for: &'static [&'static str],
    pub instruments: &'static [&'static str],
    pub avoid_instruments: &'static [&'static str],
    pub bonus_hz: f64,
    pub bonus_label: &'static str,
}

impl ZodiacProfile {
    pub fn element(&self) -> Element {
        self.sign.element()
    }

    pub fn quality(&self) -> Quality {
        self.sign.quality()
    }
}

/// Profile for a phase bucket.
pub fn phase_profile(phase: PhaseName) -> &'static PhaseProfile {
    &PHASE_PROFILES[phase.index()]
}

/// Profile for a sign.
pub fn zodiac_profile(sign: ZodiacSign) -> &'static ZodiacProfile {
    &ZODIAC_PROFILES[sign.index()]
}

use FrequencyKind::{Planetary, Primary, Secondary};

const MOON_TONE: Frequency = Frequency::fixed(MOON_TONE_HZ, "Moon planetary tone", Planetary);

static PHASE_PROFILES: [PhaseProfile; 8] = [
    PhaseProfile {
        phase: PhaseName::NewMoon,
        subtitle: "Void & Beginning",
        quote: "The dark before the light. Plant seeds here.",
        energy: "Inward, still, potent with potential",
        ideal_for: &[
            "Intention setting",
            "Silent meditation",
            "Vision work",
            "Yin sound baths",
            "Journaling and reflection",
        ],
        avoid: &[
            "High-energy activations",
            "Loud percussive work",
            "Large group sessions",
        ],
        frequencies: &[
            Frequency::fixed(396.0, "Liberation (UT)", Primary),
            Frequency::fixed(174.0, "Foundation", Secondary),
            MOON_TONE,
        ],
        instruments: &["Monochord", "Crystal singing bowls (low)", "Shruti box", "Ocean drum"],
        colour: "#1A1A4E",
    },
    PhaseProfile {
        phase: PhaseName::WaxingCrescent,
        subtitle: "Emergence & Intention",
        quote: "A sliver of light appears. Let your intentions take shape.",
        energy: "Tentative, hopeful, gathering momentum",
        ideal_for: &[
            "Setting intentions with sound",
            "Gentle activation practices",
            "Breathwork with toning",
            "Small group work",
        ],
        avoid: &["Release or letting-go practices", "Heavy emotional processing"],
        frequencies: &[
            Frequency::fixed(417.0, "Facilitating change (RE)", Primary),
            Frequency::fixed(285.0, "Healing tissue", Secondary),
            MOON_TONE,
        ],
        instruments: &["Crystal singing bowls", "Chimes", "Kalimba", "Handpan"],
        colour: "#8B7EC8",
    },
    PhaseProfile {
        phase: PhaseName::FirstQuarter,
        subtitle: "Action & Decision",
        quote: "Half-lit, half-shadowed. Commit to the path.",
        energy: "Dynamic, decisive, tension between old and new",
        ideal_for: &[
            "Activating sound journeys",
            "Rhythmic drumming circles",
            "Movement with sound",
            "Overcoming resistance",
        ],
        avoid: &[
            "Purely passive practices",
            "Avoiding conflict or tension in sessions",
        ],
        frequencies: &[
            Frequency::fixed(528.0, "Transformation (MI)", Primary),
            Frequency::fixed(417.0, "Facilitating change (RE)", Secondary),
            MOON_TONE,
        ],
        instruments: &["Drums", "Rattles", "Crystal bowls (mid-range)", "Didgeridoo"],
        colour: "#8B7EC8",
    },
    PhaseProfile {
        phase: PhaseName::WaxingGibbous,
        subtitle: "Refinement & Trust",
        quote: "The moon is building power. So is your work.",
        energy: "Building, refining, almost full, anticipatory",
        ideal_for: &[
            "Intensifying intention",
            "Deepening breathwork",
            "Building group field",
            "Sustained toning",
            "Layered sound baths",
        ],
        avoid: &[
            "Completion work",
            "Release practices — save those for after the full moon",
        ],
        frequencies: &[
            Frequency::fixed(528.0, "Transformation (MI)", Primary),
            Frequency::fixed(741.0, "Expression (SOL)", Secondary),
            MOON_TONE,
        ],
        instruments: &["Crystal singing bowls", "Gong (building)", "Monochord", "Voice"],
        colour: "#8B7EC8",
    },
    PhaseProfile {
        phase: PhaseName::FullMoon,
        subtitle: "Peak Illumination",
        quote: "Maximum light. Maximum feeling. Hold nothing back.",
        energy: "Expansive, emotional, powerful, culminating",
        ideal_for: &[
            "Group sound journeys",
            "Gong baths",
            "Emotional release",
            "Toning and mantra",
            "Ceremony",
            "Full moon circles",
        ],
        avoid: &[
            "Quiet introspective work — energy is too high",
            "Detailed planning — feel instead",
        ],
        frequencies: &[
            Frequency::fixed(432.0, "Universal harmony", Primary),
            Frequency::fixed(528.0, "Transformation (MI)", Secondary),
            MOON_TONE,
        ],
        instruments: &[
            "Gong",
            "Large crystal bowls",
            "Drums",
            "Voice",
            "All instruments welcome",
        ],
        colour: "#E8C97A",
    },
    PhaseProfile {
        phase: PhaseName::WaningGibbous,
        subtitle: "Gratitude & Integration",
        quote: "The peak has passed. Gather what you have learned.",
        energy: "Reflective, grateful, integrating, still strong",
        ideal_for: &[
            "Integration sound baths",
            "Gratitude practices",
            "Sharing circles with sound",
            "Gentle gong work",
        ],
        avoid: &["Starting new projects or intentions", "High-activation practices"],
        frequencies: &[
            Frequency::fixed(639.0, "Connecting (FA)", Primary),
            Frequency::fixed(528.0, "Transformation (MI)", Secondary),
            MOON_TONE,
        ],
        instruments: &["Crystal bowls", "Monochord", "Singing bowls (Tibetan)", "Chimes"],
        colour: "#C87E8B",
    },
    PhaseProfile {
        phase: PhaseName::LastQuarter,
        subtitle: "Release & Forgiveness",
        quote: "Half-dark again. Let go of what no longer serves.",
        energy: "Releasing, cleansing, making space",
        ideal_for: &[
            "Release ceremonies",
            "Forgiveness practices",
            "Sound clearing",
            "Cutting-cord meditations with sound",
        ],
        avoid: &["Building or amplifying energy", "Starting new group work"],
        frequencies: &[
            Frequency::fixed(741.0, "Expression & cleansing (SOL)", Primary),
            Frequency::fixed(852.0, "Intuition (LA)", Secondary),
            MOON_TONE,
        ],
        instruments: &["Rattles", "Drums", "Didgeridoo", "Tibetan singing bowls"],
        colour: "#C87E8B",
    },
    PhaseProfile {
        phase: PhaseName::WaningCrescent,
        subtitle: "Surrender & Rest",
        quote: "Almost dark. Surrender. The void is near.",
        energy: "Surrendering, resting, preparing for renewal",
        ideal_for: &[
            "Deep rest sound baths",
            "Yoga Nidra with sound",
            "Silence and stillness",
            "Solo practice",
            "Restorative sessions",
        ],
        avoid: &[
            "Stimulating practices",
            "Large group work",
            "Goal-setting — wait for the new moon",
        ],
        frequencies: &[
            Frequency::fixed(963.0, "Divine connection (TI)", Primary),
            Frequency::fixed(174.0, "Foundation", Secondary),
            MOON_TONE,
        ],
        instruments: &[
            "Monochord",
            "Shruti box",
            "Crystal bowls (low)",
            "Ocean drum",
            "Silence",
        ],
        colour: "#C87E8B",
    },
];

static ZODIAC_PROFILES: [ZodiacProfile; 12] = [
    ZodiacProfile {
        sign: ZodiacSign::Aries,
        energy: "Initiating, bold, fiery, courageous",
        session_mood: "Ignite the room. This moon favours activation, movement, and primal expression.",
        ideal_for: &[
            "Activating sound journeys",
            "Drumming circles",
            "Movement-based sound healing",
            "Breathwork with percussive sound",
        ],
        instruments: &["Drums", "Rattles", "Didgeridoo", "Large gong"],
        avoid_instruments: &["Gentle chimes — too soft for this energy"],
        bonus_hz: 417.0,
        bonus_label: "Facilitating change (RE)",
    },
    ZodiacProfile {
        sign: ZodiacSign::Taurus,
        energy: "Grounding, sensual, steady, embodied",
        session_mood: "Slow and lush. Ground the body deeply. This moon wants to be felt, not rushed.",
        ideal_for: &[
            "Grounding sound baths",
            "Body-focused sessions",
            "Nature-connected sound work",
            "Sensory-rich experiences",
        ],
        instruments: &["Crystal singing bowls", "Monochord", "Handpan", "Earth gong"],
        avoid_instruments: &["Harsh or jarring tones — this energy craves beauty"],
        bonus_hz: 174.0,
        bonus_label: "Foundation",
    },
    ZodiacProfile {
        sign: ZodiacSign::Gemini,
        energy: "Curious, communicative, dual, playful",
        session_mood: "Light and varied. Mix textures, alternate instruments, keep the mind engaged.",
        ideal_for: &[
            "Multi-instrument sound journeys",
            "Guided vocal toning",
            "Interactive group sessions",
            "Storytelling with sound",
        ],
        instruments: &["Chimes", "Kalimba", "Multiple small bowls", "Voice"],
        avoid_instruments: &["Single sustained drones — this energy needs variety"],
        bonus_hz: 741.0,
        bonus_label: "Expression (SOL)",
    },
    ZodiacProfile {
        sign: ZodiacSign::Cancer,
        energy: "Nurturing, emotional, protective, intuitive",
        session_mood: "Create a womb of sound. Nurture, hold, protect. Emotions will surface — let them.",
        ideal_for: &[
            "Nurturing sound baths",
            "Emotional processing sessions",
            "Mother-child bonding sound work",
            "Heart-opening practices",
        ],
        instruments: &["Crystal singing bowls", "Ocean drum", "Monochord", "Shruti box"],
        avoid_instruments: &["Aggressive percussion — too jarring for emotional work"],
        bonus_hz: 639.0,
        bonus_label: "Connecting (FA)",
    },
    ZodiacProfile {
        sign: ZodiacSign::Leo,
        energy: "Radiant, confident, creative, generous",
        session_mood: "Let it shine. Encourage self-expression, creative toning, and joyful movement.",
        ideal_for: &[
            "Creative expression sessions",
            "Group toning and mantra",
            "Celebratory sound ceremonies",
            "Performance and sharing circles",
        ],
        instruments: &["Gong", "Large crystal bowls", "Drums", "Voice"],
        avoid_instruments: &["Overly subtle instruments — this energy wants presence"],
        bonus_hz: 528.0,
        bonus_label: "Transformation (MI)",
    },
    ZodiacProfile {
        sign: ZodiacSign::Virgo,
        energy: "Precise, healing, analytical, service-oriented",
        session_mood: "Precision healing. Focus on specific body areas, detailed frequency work, refined technique.",
        ideal_for: &[
            "Targeted frequency healing",
            "Tuning fork sessions",
            "Body scanning with sound",
            "Detailed chakra work",
        ],
        instruments: &[
            "Tuning forks",
            "Crystal singing bowls (specific notes)",
            "Tibetan bowls",
            "Monochord",
        ],
        avoid_instruments: &["Chaotic layering — this energy needs clarity"],
        bonus_hz: 285.0,
        bonus_label: "Healing tissue",
    },
    ZodiacProfile {
        sign: ZodiacSign::Libra,
        energy: "Harmonious, balanced, relational, aesthetic",
        session_mood: "Seek balance. Pair instruments, create harmonic intervals, beauty above all.",
        ideal_for: &[
            "Harmonic sound baths",
            "Partner sound healing",
            "Aesthetic ceremony design",
            "Balancing chakra work",
        ],
        instruments: &["Crystal singing bowls (paired)", "Chimes", "Harp", "Handpan"],
        avoid_instruments: &["Dissonant or harsh tones — this energy seeks harmony"],
        bonus_hz: 639.0,
        bonus_label: "Connecting (FA)",
    },
    ZodiacProfile {
        sign: ZodiacSign::Scorpio,
        energy: "Depth, transformation, shadow integration, catharsis",
        session_mood: "Go deep. This is a moon for shadow work, not comfort. Allow catharsis.",
        ideal_for: &[
            "Shadow integration",
            "Trauma-release sound baths",
            "Cathartic breathwork",
            "Deep gong immersions",
        ],
        instruments: &["Gong", "Didgeridoo", "Low crystal bowls", "Drum"],
        avoid_instruments: &["High-pitched bells — too light for this energy"],
        bonus_hz: 396.0,
        bonus_label: "Liberation (UT)",
    },
    ZodiacProfile {
        sign: ZodiacSign::Sagittarius,
        energy: "Expansive, philosophical, adventurous, visionary",
        session_mood: "Expand the field. Take the group on a journey. Think big, explore widely.",
        ideal_for: &[
            "Sound journeys with narrative",
            "Expansive gong baths",
            "Vision quest sound work",
            "Cross-cultural instrument fusion",
        ],
        instruments: &["Gong", "Didgeridoo", "Drums (varied)", "Singing bowls"],
        avoid_instruments: &["Repetitive single-note work — this energy needs expansion"],
        bonus_hz: 852.0,
        bonus_label: "Intuition (LA)",
    },
    ZodiacProfile {
        sign: ZodiacSign::Capricorn,
        energy: "Structured, disciplined, grounding, ambitious",
        session_mood: "Structure the session. Clear intention, steady rhythm, purposeful progression.",
        ideal_for: &[
            "Structured sound healing sessions",
            "Grounding practices",
            "Bone and joint focused work",
            "Discipline-building meditation",
        ],
        instruments: &["Tibetan singing bowls", "Monochord", "Tuning forks", "Frame drum"],
        avoid_instruments: &["Freestyle or chaotic layering — this energy needs structure"],
        bonus_hz: 174.0,
        bonus_label: "Foundation",
    },
    ZodiacProfile {
        sign: ZodiacSign::Aquarius,
        energy: "Innovative, humanitarian, electric, unconventional",
        session_mood: "Experiment. Try unusual combinations, electronic elements, group coherence fields.",
        ideal_for: &[
            "Experimental sound sessions",
            "Group coherence practices",
            "Electronic-acoustic fusion",
            "Sound and technology integration",
        ],
        instruments: &["Synthesizer", "Crystal bowls", "Gong", "Unconventional sound sources"],
        avoid_instruments: &["Overly traditional or rigid approaches"],
        bonus_hz: 963.0,
        bonus_label: "Divine connection (TI)",
    },
    ZodiacProfile {
        sign: ZodiacSign::Pisces,
        energy: "Dreamy, spiritual, dissolving, transcendent",
        session_mood: "Dissolve boundaries. This is the most spiritual moon. Let sound become prayer.",
        ideal_for: &[
            "Deep meditation sound baths",
            "Yoga Nidra with sound",
            "Spiritual ceremony",
            "Shamanic journeying",
        ],
        instruments: &[
            "Ocean drum",
            "Crystal singing bowls",
            "Monochord",
            "Shruti box",
            "Voice",
        ],
        avoid_instruments: &["Sharp or percussive sounds — this energy needs to float"],
        bonus_hz: 963.0,
        bonus_label: "Divine connection (TI)",
    },
];
