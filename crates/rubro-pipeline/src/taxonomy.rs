//! Reference economic-sector taxonomy
//!
//! The SII top-level sectors with a short description each, rendered into
//! the classification prompt.

/// Label and description of every reference sector
pub const REFERENCE_RUBROS: &[(&str, &str)] = &[
    (
        "ACTIVIDADES DE ATENCION DE LA SALUD HUMANA Y DE ASISTENCIA SOCIAL",
        "Servicios médicos, hospitalarios, dentales, laboratorios clínicos, asistencia a personas mayores, con discapacidad o en rehabilitación, centros de salud y asistencia social sin alojamiento.",
    ),
    (
        "INFORMACION Y COMUNICACIONES",
        "Servicios de tecnologías de la información, desarrollo de software, telecomunicaciones, medios de comunicación (radio, TV, cine), edición de libros y periódicos, y portales web.",
    ),
    (
        "COMERCIO AL POR MAYOR Y AL POR MENOR; REPARACION DE VEHICULOS AUTOMOTORES Y MOTOCICLETAS",
        "Venta de productos al por menor y mayor (alimentos, ropa, tecnología), comercio por internet, venta y reparación de vehículos, combustibles y repuestos.",
    ),
    (
        "INDUSTRIA MANUFACTURERA",
        "Transformación de materias primas en productos elaborados como alimentos, textiles, productos químicos, maquinaria, muebles, productos metálicos, vehículos y equipos electrónicos.",
    ),
    (
        "ENSEÑANZA",
        "Servicios educativos en todos los niveles: preescolar, básica, media, superior, formación técnica y profesional, e instrucción especializada.",
    ),
    (
        "AGRICULTURA, GANADERIA, SILVICULTURA Y PESCA",
        "Incluye actividades agrícolas como el cultivo de cereales, hortalizas, frutas, legumbres, semillas y plantas especiales; ganadería con la cría de aves, bovinos, ovinos, cerdos y otros animales; actividades forestales como extracción de madera, reforestación y servicios silvícolas; y pesca y acuicultura tanto marítima como de agua dulce, junto con servicios asociados. Eliminación de plagas agricolas",
    ),
    (
        "TRANSPORTE Y ALMACENAMIENTO",
        "Comprende el transporte de carga y pasajeros por carretera, ferrocarril, aéreo, marítimo y vías interiores; servicios de apoyo al transporte (como terminales, agencias, carga y descarga); actividades de almacenamiento incluyendo frigoríficos y bodegas; y servicios postales y de mensajería.",
    ),
    (
        "ACTIVIDADES PROFESIONALES, CIENTIFICAS Y TECNICAS",
        "Incluye servicios de consultoría, ingeniería, arquitectura, contabilidad, auditoría, asesoría legal, publicidad, diseño, estudios de mercado, investigación científica y técnica, veterinaria y actividades especializadas como traducción, fotografía y revisión técnica.",
    ),
    (
        "ACTIVIDADES DE SERVICIOS ADMINISTRATIVOS Y DE APOYO",
        "Engloba servicios de alquiler de maquinaria, vehículos y equipos; limpieza, jardinería, fumigación de tipo no agricola; agencias de viajes y empleo; call centers; seguridad privada; apoyo administrativo y logístico a empresas; organización de eventos; actividades de cobranza y clasificación crediticia.",
    ),
    (
        "CONSTRUCCION",
        "Cubre la construcción de edificios residenciales y no residenciales, obras de infraestructura como caminos, ferrocarriles y servicios públicos; preparación del terreno, demolición, instalaciones eléctricas y sanitarias, terminaciones, y otras obras especializadas de construcción.",
    ),
    (
        "OTRAS ACTIVIDADES DE SERVICIOS",
        "Incluye servicios personales como peluquería, masajes, lavandería, servicios funerarios, reparación de bienes personales y del hogar, y actividades de asociaciones, sindicatos, organizaciones religiosas, políticas, culturales y sociales.",
    ),
    (
        "ACTIVIDADES DE ALOJAMIENTO Y DE SERVICIO DE COMIDAS",
        "Comprende la operación de hoteles, moteles, residenciales, campings y otros alojamientos turísticos; además de restaurantes, servicios de banquetería, concesiones de alimentación, y bares o discotecas con servicio de bebidas.",
    ),
    (
        "ACTIVIDADES INMOBILIARIAS",
        "Abarca la compra, venta y arriendo de bienes raíces, tanto amoblados como no amoblados; servicios de gestión inmobiliaria prestados por terceros; y servicios imputados de alquiler de viviendas.",
    ),
    (
        "SUMINISTRO DE AGUA; EVACUACION DE AGUAS RESIDUALES, GESTION DE DESECHOS Y DESCONTAMINACION",
        "Incluye la captación y distribución de agua potable; la recolección, tratamiento y eliminación de desechos sólidos y líquidos (peligrosos y no peligrosos); reciclaje de materiales como papel, vidrio y metales; y actividades de descontaminacion ambiental.",
    ),
    (
        "ACTIVIDADES FINANCIERAS Y DE SEGUROS",
        "Incluye bancos, financieras, aseguradoras, AFP, isapres, fondos de inversión, leasing, casas de cambio, bolsas, agentes de valores, clasificadoras de riesgo, administradores de tarjetas de crédito y servicios auxiliares como asesorías e intermediación financiera.",
    ),
    (
        "EXPLOTACION DE MINAS Y CANTERAS",
        "Incluye la extracción y procesamiento de minerales metálicos y no metálicos como cobre, oro, plata, hierro, sal, carbón, piedra y arcilla, así como actividades de apoyo para la minería y explotación de petróleo y gas natural. Base estabilizado, gravilla o arena y relacionados.",
    ),
    (
        "ACTIVIDADES ARTISTICAS, DE ENTRETENIMIENTO Y RECREATIVAS",
        "Comprende actividades culturales y recreativas como teatros, conciertos, museos, bibliotecas, clubes deportivos, artistas independientes, juegos de azar, casinos, parques temáticos, zoológicos, jardines botánicos y periodismo independiente.",
    ),
    (
        "ADMINISTRACION PUBLICA Y DEFENSA; PLANES DE SEGURIDAD SOCIAL DE AFILIACION OBLIGATORIA",
        "Abarca la gestión pública, la defensa nacional, el orden público, regulación de servicios sociales y culturales, y los sistemas obligatorios de seguridad social. La emisión de documentos, certificados, derechos, servicios y permisos estatales. Otorgamiento de derechos.",
    ),
    (
        "ACTIVIDADES DE ORGANIZACIONES Y ORGANOS EXTRATERRITORIALES",
        "Incluye las actividades de organismos internacionales y misiones diplomáticas extranjeras en el país.",
    ),
    (
        "SUMINISTRO DE ELECTRICIDAD, GAS, VAPOR Y AIRE ACONDICIONADO",
        "Comprende la generación, transmisión y distribución de electricidad, la producción y suministro de gas, vapor, aire acondicionado e incluso la elaboración de hielo.",
    ),
    (
        "ACTIVIDADES DE LOS HOGARES COMO EMPLEADORES; ACTIVIDADES NO DIFERENCIADAS DE LOS HOGARES",
        "Se refiere exclusivamente al empleo de personal doméstico por parte de los hogares.",
    ),
];

/// Sector label of public administration, used by the prompt rules
pub const PUBLIC_ADMINISTRATION: &str =
    "ADMINISTRACION PUBLICA Y DEFENSA; PLANES DE SEGURIDAD SOCIAL DE AFILIACION OBLIGATORIA";

/// An ordered set of sector labels with descriptions
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Taxonomy {
    entries: Vec<(String, String)>,
}

impl Taxonomy {
    /// Build a taxonomy from `(label, description)` pairs
    pub fn new(entries: Vec<(String, String)>) -> Self {
        Self { entries }
    }

    /// The built-in SII reference sectors
    pub fn reference() -> Self {
        Self::new(
            REFERENCE_RUBROS
                .iter()
                .map(|(label, description)| (label.to_string(), description.to_string()))
                .collect(),
        )
    }

    /// Number of sectors
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the taxonomy has no sectors
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Whether `label` names a sector (case-insensitive)
    pub fn contains(&self, label: &str) -> bool {
        let label = label.trim().to_uppercase();
        self.entries.iter().any(|(known, _)| *known == label)
    }

    /// Render as `- LABEL: description` lines
    pub fn render(&self) -> String {
        self.entries
            .iter()
            .map(|(label, description)| format!("- {}: {}", label, description))
            .collect::<Vec<_>>()
            .join("\n")
    }
}

impl Default for Taxonomy {
    fn default() -> Self {
        Self::reference()
    }
}
