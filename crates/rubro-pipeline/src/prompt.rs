//! Prompt construction for completion and classification calls

use crate::preprocess::completion_input;
use crate::taxonomy::Taxonomy;

const COMPLETION_INSTRUCTIONS: &str = "Corrige o completa el siguiente texto en español. El texto contiene el nombre del comprador y vendedor, productos comprados, y otra información contextual como el giro del comprador y si la venta es a consumidor final.
Extrae los siguientes campos del contexto y preséntalos en formato `clave:valor`, uno por línea. No incluyas títulos, viñetas ni texto adicional. Las claves a usar son: vendedor, comprador, fecha, monto_total, producto, cantidad, monto_item.

1. Añade contexto relevante a los productos. Si es poco informativo, corrige o ajusta los productos para que sean más lógicos.
2. Asegúrate de que el **giro del comprador tenga coherencia con su nombre**. Si no es creíble, corrige o ajusta el giro para que sea más lógico.
3. Si la venta es a consumidor final, tenlo en cuenta para ajustar el lenguaje o detalles del giro.
4. El texto resultante debe estar completamente en español, limpio y con sentido.
5. Si el contenido del detalle del producto comprado viene sin información, retorna el comentario \"sin información relevante\". Ejemplo: si en detalle se detalla \" \" retorna \"sin información relevante\"";

const COMPLETION_CLOSING: &str = "Importante: responde únicamente con el texto corregido en español, sin explicaciones, títulos ni traducciones.

Texto corregido:
";

const CLASSIFICATION_RULES: &str = "Con esta información y los detalles de los documentos:

1. **Analiza cada documento** individualmente en los segmentos de \"Información del RUT (emisor o vendedor)\" e \"Información del RUT (receptor o comprador)\".
2. **Identifica el rol del RUT bajo análisis en CADA DOCUMENTO**: si en un documento el RUT es el \"Nombre del vendedor\", analiza lo que vende; si en un documento el RUT es el \"Nombre del comprador\", analiza lo que compra.
3. **Relaciona el contenido del documento** (especialmente los \"Productos vendidos\", \"Giro del comprador\", y si es \"Venta a consumidor final\") con una o más actividades económicas del \"Resumen de Rubros Económicos de Referencia\" que se te proporciona.
4. **Compara** la(s) actividad(es) económica(s) que asignes con los \"Rubros que el RUT declara tener\" que se te proporcionan.

---

### Reglas especiales (Prioridad Alta):

6. Si el \"Nombre del vendedor\" o el \"Nombre del comprador\" en **cualquier documento relevante** corresponde a una entidad pública, estatal, ministerial, municipal, o de regulación nacional (ej. \"Municipalidad de...\", \"Ministerio de...\", \"Servicio de...\", \"Tesorería General de...\"), asigna **prioritariamente** el siguiente rubro:

   **\"ADMINISTRACION PUBLICA Y DEFENSA; PLANES DE SEGURIDAD SOCIAL DE AFILIACION OBLIGATORIA\"**
   Y justifica específicamente con el nombre de la entidad pública encontrada.

7. Si el \"Productos vendidos\" en un documento específico contiene **exactamente** \"sin información relevante\", basa la clasificación de ese documento principalmente en el **\"Nombre del vendedor\" o \"Nombre del comprador\"** (según el rol del RUT en ese documento) y el \"Giro del comprador\" (si es relevante).

8. Si el \"Nombre del vendedor\" o \"Nombre del comprador\" en **cualquier documento relevante** es **claramente informativo** y sugiere un rubro específico (ej: \"Universidad de Chile\" -> \"ENSEÑANZA\", \"Hospital del Trabajador\" -> \"ACTIVIDADES DE ATENCION DE LA SALUD HUMANA Y DE ASISTENCIA SOCIAL\"), asigna el rubro directamente relacionado con ese nombre del resumen, **incluso si el resto del contenido del documento es ambiguo o \"sin información relevante\"**. Prioriza la información del nombre si es muy clara.

9. Responde en formato JSON: {\"main_rubros\": [\"Rubro1\", \"Rubro2\"], \"justification\": \"Razon de la clasificacion\"}
10.  El valor de `main_rubros` debe ser una lista de strings. Si no puedes determinar un rubro con certeza, devuelve una lista vacía `[]`.
11.  El valor de `justification` debe ser una cadena de texto explicando concisamente tu razonamiento.
12. Tu salida debe ser **ÚNICA Y EXCLUSIVAMENTE un objeto JSON válido**.
13. Los **rubros declarados por el rut pueden ser erroneos**, ya que el rut puede estar mintiendo o por desconocimiento.
14. Los productos que un rut puede vender, **no necesariamente son fabricados por el**. Para asignar rubro manufactura asegurate muy bien de los productos sean fabricados por el rut.";

const NO_EMISOR_TEXTS: &str = "No hay textos de emisor.";
const NO_RECEPTOR_TEXTS: &str = "No hay textos de receptor.";
const NO_DECLARED_RUBROS: &str = "No se conocen rubros actuales.";

/// Builds the prompts sent to the LLM
#[derive(Debug, Clone, Default)]
pub struct PromptBuilder {
    taxonomy: Taxonomy,
}

impl PromptBuilder {
    /// Create a prompt builder over a reference taxonomy
    pub fn new(taxonomy: Taxonomy) -> Self {
        Self { taxonomy }
    }

    /// The reference taxonomy rendered into classification prompts
    pub fn taxonomy(&self) -> &Taxonomy {
        &self.taxonomy
    }

    /// Completion prompt for one raw document
    ///
    /// The document is normalized and summarized before being embedded.
    pub fn completion(&self, raw_document: &str) -> String {
        let summary = completion_input(raw_document);
        let mut prompt = String::with_capacity(
            COMPLETION_INSTRUCTIONS.len() + COMPLETION_CLOSING.len() + summary.len() + 32,
        );
        prompt.push_str(COMPLETION_INSTRUCTIONS);
        prompt.push_str("\n\nTexto original: \"");
        prompt.push_str(&summary);
        prompt.push_str("\"\n\n");
        prompt.push_str(COMPLETION_CLOSING);
        prompt
    }

    /// Classification prompt for one entity
    pub fn classification(
        &self,
        emisor_completions: &[String],
        receptor_completions: &[String],
        declared_rubros: Option<&[String]>,
    ) -> String {
        let emisor = join_or(emisor_completions, "\n", NO_EMISOR_TEXTS);
        let receptor = join_or(receptor_completions, "\n", NO_RECEPTOR_TEXTS);
        let declared = join_or(declared_rubros.unwrap_or_default(), ", ", NO_DECLARED_RUBROS);

        let mut prompt = String::new();
        prompt.push_str("Se requiere clasificar la actividad económica de un RUT basándose en sus interacciones como emisor (ventas) y receptor (compras) de documentos.\n\n");
        prompt.push_str(&format!("Ventas del RUT (emisor):\n{}\n\n", emisor));
        prompt.push_str(&format!("Compras del RUT (receptor):\n{}\n\n", receptor));
        prompt.push_str(&format!("Rubros que el RUT declara tener: {}\n\n", declared));
        prompt.push_str(&format!(
            "Resumen de Rubros Económicos de Referencia:\n{}\n\n",
            self.taxonomy.render()
        ));
        prompt.push_str(CLASSIFICATION_RULES);
        prompt.push_str("\n\nBasado en esta información, ¿cuáles son los rubros principales a los que este RUT pertenece? Proporciona una justificación concisa.\n");
        prompt
    }
}

fn join_or(items: &[String], separator: &str, fallback: &str) -> String {
    if items.is_empty() {
        fallback.to_string()
    } else {
        items.join(separator)
    }
}
