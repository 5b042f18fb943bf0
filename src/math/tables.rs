//! Constant lookup tables backing [`super::Fixed::sin`] and [`super::Fixed::recip`].
//!
//! Both tables are plain data baked into the binary; nothing is computed at
//! start-up.

/// Number of samples covering one quarter turn.
pub const SIN_TABLE_SIZE: usize = 256;

/// Number of samples covering the reciprocal window.
pub const RECIP_TABLE_SIZE: usize = 256;

/// Lower edge of the reciprocal window (0.25 in Q16.16).
pub const RECIP_MIN: i32 = 16_384;

/// Upper edge of the reciprocal window (4.0 in Q16.16).
pub const RECIP_MAX: i32 = 262_144;

/// `sin(i * 90° / 255)` in Q16.16, `i` in `0..256`.
pub static SIN_TABLE: [i32; SIN_TABLE_SIZE] = [
    0, 404, 807, 1211, 1615, 2018, 2422, 2825,
    3228, 3631, 4034, 4437, 4840, 5243, 5645, 6047,
    6449, 6850, 7252, 7653, 8054, 8454, 8854, 9254,
    9654, 10053, 10451, 10850, 11248, 11645, 12042, 12439,
    12835, 13231, 13626, 14020, 14414, 14808, 15201, 15593,
    15985, 16376, 16767, 17157, 17546, 17935, 18323, 18710,
    19097, 19482, 19867, 20252, 20635, 21018, 21400, 21781,
    22162, 22541, 22920, 23297, 23674, 24050, 24425, 24800,
    25173, 25545, 25916, 26287, 26656, 27024, 27391, 27758,
    28123, 28487, 28850, 29212, 29573, 29932, 30291, 30648,
    31005, 31360, 31714, 32066, 32418, 32768, 33117, 33465,
    33811, 34156, 34500, 34843, 35184, 35524, 35863, 36200,
    36536, 36870, 37203, 37535, 37865, 38194, 38521, 38847,
    39171, 39494, 39816, 40136, 40454, 40771, 41086, 41400,
    41712, 42023, 42332, 42639, 42945, 43249, 43551, 43852,
    44151, 44449, 44745, 45039, 45331, 45622, 45911, 46198,
    46483, 46767, 47049, 47329, 47608, 47884, 48159, 48432,
    48703, 48972, 49239, 49505, 49768, 50030, 50290, 50548,
    50804, 51058, 51310, 51560, 51808, 52055, 52299, 52541,
    52781, 53020, 53256, 53490, 53723, 53953, 54181, 54407,
    54631, 54853, 55073, 55291, 55506, 55720, 55931, 56141,
    56348, 56553, 56756, 56957, 57155, 57352, 57546, 57738,
    57928, 58116, 58301, 58484, 58665, 58844, 59021, 59195,
    59367, 59537, 59705, 59870, 60033, 60194, 60352, 60509,
    60663, 60814, 60964, 61111, 61255, 61398, 61538, 61675,
    61811, 61944, 62074, 62203, 62328, 62452, 62573, 62692,
    62808, 62923, 63034, 63143, 63250, 63355, 63457, 63557,
    63654, 63749, 63841, 63931, 64019, 64104, 64187, 64267,
    64345, 64420, 64493, 64564, 64632, 64697, 64760, 64821,
    64879, 64935, 64988, 65039, 65088, 65134, 65177, 65218,
    65256, 65292, 65326, 65357, 65386, 65412, 65435, 65456,
    65475, 65491, 65505, 65516, 65525, 65531, 65535, 65536,
];

/// `1 / (0.25 + i * 3.75 / 255)` in Q16.16, `i` in `0..256`.
pub static RECIP_TABLE: [i32; RECIP_TABLE_SIZE] = [
    262144, 247580, 234550, 222822, 212212, 202566, 193759, 185685,
    178258, 171402, 165054, 159159, 153671, 148548, 143756, 139264,
    135044, 131072, 127327, 123790, 120445, 117275, 114268, 111411,
    108694, 106106, 103638, 101283, 99032, 96879, 94818, 92843,
    90948, 89129, 87381, 85701, 84084, 82527, 81026, 79579,
    78183, 76835, 75533, 74274, 73057, 71878, 70737, 69632,
    68561, 67522, 66514, 65536, 64586, 63664, 62767, 61895,
    61047, 60222, 59419, 58637, 57876, 57134, 56411, 55706,
    55018, 54347, 53692, 53053, 52429, 51819, 51224, 50641,
    50072, 49516, 48972, 48440, 47919, 47409, 46910, 46421,
    45943, 45474, 45015, 44564, 44123, 43691, 43266, 42850,
    42442, 42042, 41649, 41263, 40885, 40513, 40148, 39790,
    39438, 39092, 38752, 38418, 38089, 37767, 37449, 37137,
    36830, 36528, 36231, 35939, 35652, 35369, 35090, 34816,
    34546, 34280, 34019, 33761, 33507, 33257, 33011, 32768,
    32529, 32293, 32061, 31832, 31606, 31383, 31164, 30948,
    30734, 30524, 30316, 30111, 29909, 29710, 29513, 29319,
    29127, 28938, 28751, 28567, 28385, 28205, 28028, 27853,
    27680, 27509, 27340, 27173, 27009, 26846, 26685, 26526,
    26370, 26214, 26061, 25910, 25760, 25612, 25465, 25321,
    25178, 25036, 24896, 24758, 24621, 24486, 24352, 24220,
    24089, 23959, 23831, 23705, 23579, 23455, 23332, 23211,
    23090, 22971, 22854, 22737, 22622, 22507, 22394, 22282,
    22171, 22062, 21953, 21845, 21739, 21633, 21529, 21425,
    21323, 21221, 21121, 21021, 20922, 20825, 20728, 20632,
    20537, 20442, 20349, 20257, 20165, 20074, 19984, 19895,
    19806, 19719, 19632, 19546, 19460, 19376, 19292, 19209,
    19126, 19045, 18964, 18883, 18804, 18725, 18646, 18569,
    18491, 18415, 18339, 18264, 18190, 18116, 18042, 17970,
    17897, 17826, 17755, 17684, 17614, 17545, 17476, 17408,
    17340, 17273, 17206, 17140, 17075, 17009, 16945, 16880,
    16817, 16754, 16691, 16629, 16567, 16505, 16444, 16384,
];
