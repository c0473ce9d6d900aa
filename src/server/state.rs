use crate::converter::Converter;

#[derive(Debug, Clone)]
pub(crate) struct ServerState {
    pub(crate) converter: Converter,
}
